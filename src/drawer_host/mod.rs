//! Length-prefixed JSON protocol between the launcher shell and the drawer core.
//!
//! Each frame is a little-endian `u32` byte count followed by one JSON document.

use crate::constants::MAX_MESSAGE_SIZE;
use crate::drawer::{DrawerEvent, DrawerService, DrawerSnapshot, PackageChangeKind};
use crate::error::AppError;
use crate::models::{Category, EffectiveApp};
use crate::platform::RecordedUsageStats;
use crate::validation::{validate_package_id, validate_usage_report};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingMessage {
    RequestDrawer,
    Refresh,
    SetCategory {
        package: String,
        category: Option<Category>,
    },
    SetHidden { package: String, value: bool },
    SetLocked { package: String, value: bool },
    SetPinned { package: String, value: bool },
    SetForceColor { package: String, value: bool },
    Launch {
        package: String,
        #[serde(default)]
        authorized: bool,
    },
    PackageChanged {
        package: String,
        kind: PackageChangeKind,
    },
    ReportUsage {
        package: String,
        started_at_ms: i64,
        duration_ms: i64,
    },
    PruneOrphans,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawerGroup {
    pub category: Category,
    pub apps: Vec<EffectiveApp>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    Drawer {
        groups: Vec<DrawerGroup>,
        pinned: Vec<EffectiveApp>,
    },
    Ack,
    Launched { package: String, ok: bool },
    Pruned { removed: usize },
    Error { message: String, retryable: bool },
}

impl OutgoingMessage {
    pub fn drawer(snapshot: &DrawerSnapshot) -> Self {
        let groups = snapshot
            .groups
            .iter()
            .map(|(category, apps)| DrawerGroup {
                category: *category,
                apps: apps.clone(),
            })
            .collect();
        OutgoingMessage::Drawer {
            groups,
            pinned: snapshot.pinned.clone(),
        }
    }

    fn from_error(e: &AppError) -> Self {
        OutgoingMessage::Error {
            message: e.to_string(),
            retryable: e.is_retryable(),
        }
    }
}

/// Read one frame. EOF before the length prefix surfaces as `UnexpectedEof`.
pub fn read_message<R: Read>(reader: &mut R) -> io::Result<IncomingMessage> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = usize::try_from(u32::from_le_bytes(len_bytes))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Message too large: {len} bytes (max: {MAX_MESSAGE_SIZE} bytes)"),
        ));
    }

    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer)?;

    serde_json::from_slice(&buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn write_message<W: Write>(writer: &mut W, message: &OutgoingMessage) -> io::Result<()> {
    let json = serde_json::to_vec(message)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Reply too large: {} bytes", json.len()),
        ));
    }
    let len = u32::try_from(json.len()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&json)?;
    writer.flush()
}

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

fn send(writer: &SharedWriter, message: &OutgoingMessage) -> io::Result<()> {
    let mut guard = writer.lock().unwrap_or_else(PoisonError::into_inner);
    write_message(&mut *guard, message)
}

pub struct DrawerHost {
    service: Arc<DrawerService>,
    usage: Arc<RecordedUsageStats>,
    writer: SharedWriter,
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

impl DrawerHost {
    pub fn new<W>(service: Arc<DrawerService>, usage: Arc<RecordedUsageStats>, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            service,
            usage,
            writer: Arc::new(Mutex::new(Box::new(writer))),
            forwarder: Mutex::new(None),
        }
    }

    /// Serve frames from `reader` until it closes or a frame is malformed.
    pub fn run<R: Read>(&self, mut reader: R) -> io::Result<()> {
        loop {
            let message = read_message(&mut reader)?;
            if let Some(reply) = self.handle_message(message) {
                send(&self.writer, &reply)?;
            }
        }
    }

    /// Stop the drawer service and wait for pending pushes to drain.
    pub fn shutdown(&self) {
        self.service.stop();
        let handle = self
            .forwarder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Drawer forwarder panicked");
            }
        }
    }

    pub fn handle_message(&self, message: IncomingMessage) -> Option<OutgoingMessage> {
        let drawer = self.service.drawer();
        match message {
            IncomingMessage::RequestDrawer => {
                self.watch();
                None
            }
            IncomingMessage::Refresh => {
                self.service.refresh_handle().refresh();
                None
            }
            IncomingMessage::PackageChanged { package, kind } => {
                debug!("Package {package} {kind:?}");
                self.service.refresh_handle().notify(DrawerEvent::PackageChanged {
                    package_id: package,
                    kind,
                });
                None
            }
            IncomingMessage::SetCategory { package, category } => {
                Some(ack(drawer.set_category(&package, category)))
            }
            IncomingMessage::SetHidden { package, value } => Some(ack(drawer.set_hidden(&package, value))),
            IncomingMessage::SetLocked { package, value } => Some(ack(drawer.set_locked(&package, value))),
            IncomingMessage::SetPinned { package, value } => Some(ack(drawer.set_pinned(&package, value))),
            IncomingMessage::SetForceColor { package, value } => {
                Some(ack(drawer.set_force_color(&package, value)))
            }
            IncomingMessage::Launch { package, authorized } => Some(match drawer.launch(&package, authorized) {
                Ok(ok) => OutgoingMessage::Launched { package, ok },
                Err(e) => OutgoingMessage::from_error(&e),
            }),
            IncomingMessage::ReportUsage {
                package,
                started_at_ms,
                duration_ms,
            } => Some(ack(self.report_usage(&package, started_at_ms, duration_ms))),
            IncomingMessage::PruneOrphans => Some(match drawer.prune_orphaned_preferences() {
                Ok(removed) => OutgoingMessage::Pruned { removed },
                Err(e) => OutgoingMessage::from_error(&e),
            }),
        }
    }

    fn report_usage(&self, package: &str, started_at_ms: i64, duration_ms: i64) -> Result<(), AppError> {
        let package = validate_package_id(package)?;
        validate_usage_report(started_at_ms, duration_ms)?;
        self.usage.record(package, started_at_ms, duration_ms)
    }

    /// Subscribe on first request; later requests force a fresh push.
    ///
    /// A forwarder that stopped after a failed write is replaced.
    fn watch(&self) {
        let mut forwarder = self.forwarder.lock().unwrap_or_else(PoisonError::into_inner);
        if forwarder.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(handle) = forwarder.take() {
                if handle.join().is_err() {
                    error!("Drawer forwarder panicked");
                }
            }
            debug!("Restarting drawer forwarder");
        }
        if forwarder.is_some() {
            self.service.refresh_handle().refresh();
            return;
        }

        let subscription = self.service.subscribe();
        let writer = Arc::clone(&self.writer);
        *forwarder = Some(thread::spawn(move || {
            while let Some(snapshot) = subscription.recv() {
                if !push_snapshot(&writer, &snapshot) {
                    break;
                }
            }
            debug!("Drawer forwarder finished");
        }));
    }
}

/// Push one snapshot. Returns `false` once the writer is unusable.
fn push_snapshot(writer: &SharedWriter, snapshot: &DrawerSnapshot) -> bool {
    match send(writer, &OutgoingMessage::drawer(snapshot)) {
        Ok(()) => true,
        // Rejected before any byte was written, so the stream is still framed.
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            warn!("Drawer update not sent: {e}");
            let notice = OutgoingMessage::Error {
                message: format!("drawer update not sent: {e}"),
                retryable: false,
            };
            match send(writer, &notice) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to report dropped drawer update: {e}");
                    false
                }
            }
        }
        Err(e) => {
            warn!("Failed to push drawer update: {e}");
            false
        }
    }
}

fn ack(result: Result<(), AppError>) -> OutgoingMessage {
    match result {
        Ok(()) => OutgoingMessage::Ack,
        Err(e) => OutgoingMessage::from_error(&e),
    }
}
