pub mod categorizer;
pub mod config;
pub mod constants;
pub mod db;
pub mod drawer;
pub mod drawer_host;
pub mod error;
pub mod models;
pub mod platform;
pub mod store;
#[cfg(test)]
mod test_utils;
pub mod validation;

use crate::config::DrawerConfig;
use crate::db::{migrations, Database};
use crate::drawer::{AppDrawer, DrawerService};
use crate::platform::{AppRegistry, NativeRegistry, RecordedUsageStats, UsageStatsSource};
use crate::store::PreferenceStore;
use log::{info, warn};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Error type for drawer start-up failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Could not determine project directories")]
    NoProjectDirs,

    #[error("Could not create data directory: {0}")]
    DataDirCreation(std::io::Error),

    #[error("Failed to open database: {0}")]
    DatabaseOpen(rusqlite::Error),

    #[error("Failed to run database migrations: {0}")]
    Migration(rusqlite::Error),
}

/// Everything a front end needs to drive the drawer.
pub struct DrawerRuntime {
    pub service: Arc<DrawerService>,
    pub usage: Arc<RecordedUsageStats>,
}

/// Open the database at `db_path` and start the drawer against the native registry.
pub fn start(db_path: &Path, config: DrawerConfig) -> Result<DrawerRuntime, InitError> {
    let db = Database::open(db_path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    info!("Opened drawer database at {}", db_path.display());

    let db = Arc::new(Mutex::new(db));
    let registry: Arc<dyn AppRegistry> = Arc::new(NativeRegistry::from_environment());
    Ok(start_with(db, registry, config))
}

/// Like [`start`], with an already migrated database and a caller-chosen registry.
pub fn start_with(db: Arc<Mutex<Database>>, registry: Arc<dyn AppRegistry>, config: DrawerConfig) -> DrawerRuntime {
    let usage = Arc::new(RecordedUsageStats::new(Arc::clone(&db)));
    match usage.prune(config.usage_retention) {
        Ok(0) => {}
        Ok(removed) => info!("Pruned {removed} expired usage events"),
        Err(e) => warn!("Failed to prune usage events: {e}"),
    }

    let usage_source: Arc<dyn UsageStatsSource> = Arc::<RecordedUsageStats>::clone(&usage);
    let store = Arc::new(PreferenceStore::new(db));
    let drawer = AppDrawer::new(registry, usage_source, store, config);
    let service = Arc::new(DrawerService::start(Arc::new(drawer)));
    DrawerRuntime { service, usage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{launchable, setup_shared_db, FakeRegistry};
    use std::time::Duration;

    #[test]
    fn test_start_opens_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = start(&dir.path().join("drawer.db"), DrawerConfig::default()).unwrap();
        runtime.service.drawer().set_hidden("com.a", true).unwrap();
        assert!(runtime.service.drawer().store().get("com.a").unwrap().unwrap().hidden);
        runtime.service.stop();
    }

    #[test]
    fn test_start_with_uses_recorded_usage() {
        let (db, _dir) = setup_shared_db();
        let registry = FakeRegistry::new(vec![launchable("com.spotify.music", "Spotify")]);
        let runtime = start_with(db, registry, DrawerConfig::default());

        let now = crate::models::unix_millis();
        runtime.usage.record("com.spotify.music", now - 60_000, 30_000).unwrap();

        let subscription = runtime.service.subscribe();
        let snapshot = subscription.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(snapshot.apps()[0].app.usage_ms, 30_000);
    }
}
