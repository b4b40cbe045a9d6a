//! Shared test utilities for Saint John.
//!
//! This module provides common setup functions and in-memory collaborators
//! used across test modules.

#![cfg(test)]

use crate::db::{migrations, Database};
use crate::error::PlatformError;
use crate::models::DeclaredCategory;
use crate::platform::{AppRegistry, LaunchableApp, UsageStatsSource, UsageSummary};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    migrations::run(db.connection()).expect("Failed to run migrations on test DB");
    (db, dir)
}

/// Same as [`setup_test_db`], wrapped for sharing between components.
pub fn setup_shared_db() -> (Arc<Mutex<Database>>, TempDir) {
    let (db, dir) = setup_test_db();
    (Arc::new(Mutex::new(db)), dir)
}

pub fn launchable(package_id: &str, label: &str) -> LaunchableApp {
    LaunchableApp {
        package_id: package_id.to_string(),
        label: label.to_string(),
        icon: None,
        declared_category: None,
        is_system: false,
    }
}

pub fn launchable_declared(package_id: &str, label: &str, declared: DeclaredCategory) -> LaunchableApp {
    LaunchableApp {
        declared_category: Some(declared),
        ..launchable(package_id, label)
    }
}

/// In-memory registry with injectable failures.
#[derive(Default)]
pub struct FakeRegistry {
    apps: Mutex<Vec<LaunchableApp>>,
    broken: Mutex<HashSet<String>>,
    listing_fails: AtomicBool,
    launched: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn new(apps: Vec<LaunchableApp>) -> Arc<Self> {
        Arc::new(Self {
            apps: Mutex::new(apps),
            ..Self::default()
        })
    }

    pub fn install(&self, app: LaunchableApp) {
        self.apps.lock().unwrap().push(app);
    }

    pub fn uninstall(&self, package_id: &str) {
        self.apps.lock().unwrap().retain(|a| a.package_id != package_id);
    }

    /// Make `app_info` fail for this package while it stays listed.
    pub fn break_entry(&self, package_id: &str) {
        self.broken.lock().unwrap().insert(package_id.to_string());
    }

    pub fn fail_listing(&self, fail: bool) {
        self.listing_fails.store(fail, Ordering::SeqCst);
    }

    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }
}

impl AppRegistry for FakeRegistry {
    fn launchable_packages(&self) -> Result<Vec<String>, PlatformError> {
        if self.listing_fails.load(Ordering::SeqCst) {
            return Err(PlatformError::Unavailable("package manager died".into()));
        }
        Ok(self.apps.lock().unwrap().iter().map(|a| a.package_id.clone()).collect())
    }

    fn app_info(&self, package_id: &str) -> Result<LaunchableApp, PlatformError> {
        if self.broken.lock().unwrap().contains(package_id) {
            return Err(PlatformError::MalformedEntry {
                package: package_id.to_string(),
                reason: "uninstalled mid-query".into(),
            });
        }
        self.apps
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.package_id == package_id)
            .cloned()
            .ok_or_else(|| PlatformError::PackageNotFound(package_id.to_string()))
    }

    fn launch(&self, package_id: &str) -> bool {
        let installed = self.apps.lock().unwrap().iter().any(|a| a.package_id == package_id);
        if installed {
            self.launched.lock().unwrap().push(package_id.to_string());
        }
        installed
    }
}

/// Usage source returning a fixed map.
pub struct FakeUsage {
    pub granted: bool,
    pub usage: HashMap<String, UsageSummary>,
}

impl FakeUsage {
    pub fn granted(entries: &[(&str, u64)]) -> Arc<Self> {
        let usage = entries
            .iter()
            .map(|(id, ms)| {
                let summary = UsageSummary {
                    foreground_ms: *ms,
                    last_used: Some(1_700_000_000_000),
                };
                ((*id).to_string(), summary)
            })
            .collect();
        Arc::new(Self { granted: true, usage })
    }

    pub fn denied() -> Arc<Self> {
        Arc::new(Self {
            granted: false,
            usage: HashMap::new(),
        })
    }
}

impl UsageStatsSource for FakeUsage {
    fn has_permission(&self) -> bool {
        self.granted
    }

    fn usage_in_window(&self, _window: Duration) -> HashMap<String, UsageSummary> {
        if self.granted {
            self.usage.clone()
        } else {
            HashMap::new()
        }
    }
}
