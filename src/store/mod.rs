use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::{Category, PreferenceRecord};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Notification sent to store subscribers after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Updated(String),
    Pruned(usize),
}

/// Single-writer persistence for per-package preferences.
pub struct PreferenceStore {
    db: Arc<Mutex<Database>>,
    subscribers: Mutex<Vec<Sender<StoreChange>>>,
}

impl PreferenceStore {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self {
            db,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self, package_id: &str) -> Result<Option<PreferenceRecord>, AppError> {
        with_connection(&self.db, "load preference", |conn| PreferenceRecord::find(conn, package_id))
    }

    pub fn all(&self) -> Result<HashMap<String, PreferenceRecord>, AppError> {
        let records = with_connection(&self.db, "load preferences", PreferenceRecord::find_all)?;
        Ok(records.into_iter().map(|r| (r.package_id.clone(), r)).collect())
    }

    /// Read-modify-write the record for `package_id` under one lock.
    ///
    /// A missing record starts with an `Other` override and every flag
    /// cleared, then `change` is applied. Subscribers are notified only when
    /// something was written.
    pub fn update<F>(&self, package_id: &str, change: F) -> Result<PreferenceRecord, AppError>
    where
        F: FnOnce(&mut PreferenceRecord),
    {
        let (record, written) = with_connection(&self.db, "save preference", |conn| {
            let existing = PreferenceRecord::find(conn, package_id)?;
            let mut record = existing.clone().unwrap_or_else(|| PreferenceRecord {
                category_override: Some(Category::Other),
                ..PreferenceRecord::new(package_id)
            });
            change(&mut record);

            if existing.as_ref() == Some(&record) {
                return Ok((record, false));
            }
            record.upsert(conn)?;
            Ok((record, true))
        })?;

        if written {
            debug!("Preference for {package_id} updated");
            self.notify(&StoreChange::Updated(package_id.to_string()));
        }
        Ok(record)
    }

    /// Delete every record whose package is not in `keep`.
    pub fn prune(&self, keep: &HashSet<String>) -> Result<usize, AppError> {
        let removed = with_connection(&self.db, "prune preferences", |conn| {
            let orphans: Vec<String> = PreferenceRecord::find_all(conn)?
                .into_iter()
                .map(|r| r.package_id)
                .filter(|id| !keep.contains(id))
                .collect();
            let refs: Vec<&str> = orphans.iter().map(String::as_str).collect();
            PreferenceRecord::delete_many(conn, &refs)
        })?;

        if removed > 0 {
            info!("Pruned {removed} orphaned preference records");
            self.notify(&StoreChange::Pruned(removed));
        }
        Ok(removed)
    }

    /// Receive a [`StoreChange`] for every subsequent write.
    pub fn subscribe(&self) -> Receiver<StoreChange> {
        let (tx, rx) = unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(tx);
        rx
    }

    fn notify(&self, change: &StoreChange) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}
