// src/db/helpers.rs

use crate::db::Database;
use crate::error::AppError;
use log::{error, warn};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

/// Lock the database, recovering from poisoning if necessary.
pub fn lock_db<'a>(db: &'a Arc<Mutex<Database>>, context: &str) -> MutexGuard<'a, Database> {
    match db.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context}: database mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Execute a database operation with lock handling and error mapping.
///
/// # Example
/// ```ignore
/// with_connection(&db, "load preferences", |conn| {
///     PreferenceRecord::find_all(conn)
/// })
/// ```
pub fn with_connection<F, T>(db: &Arc<Mutex<Database>>, operation: &str, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Connection) -> rusqlite::Result<T>,
{
    let db = lock_db(db, operation);
    f(db.connection()).map_err(|e| {
        error!("Failed to {operation}: {e}");
        AppError::from(e)
    })
}
