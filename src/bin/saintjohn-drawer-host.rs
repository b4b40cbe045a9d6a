//! Drawer host for the Saint John launcher shell.
//!
//! Speaks length-prefixed JSON over stdin/stdout. All diagnostics go to
//! stderr so that stdout stays a clean protocol channel.

use log::{error, info};
use saintjohn_lib::{config, config::DrawerConfig, drawer_host::DrawerHost};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db_path = match config::db_path() {
        Ok(path) => path,
        Err(e) => {
            error!("Initialization error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match saintjohn_lib::start(&db_path, DrawerConfig::default()) {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    info!("Drawer host starting");
    let host = DrawerHost::new(runtime.service, runtime.usage, io::stdout());

    // EOF is expected when the shell closes the connection
    let result = host.run(io::stdin().lock());
    host.shutdown();
    match result {
        Err(e) if e.kind() != io::ErrorKind::UnexpectedEof => {
            error!("Drawer host error: {e}");
            ExitCode::FAILURE
        }
        Ok(()) | Err(_) => {
            info!("Drawer host shut down cleanly");
            ExitCode::SUCCESS
        }
    }
}
