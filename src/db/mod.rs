pub mod helpers;
pub mod migrations;
pub mod schema;
pub use helpers::{lock_db, with_connection};

use rusqlite::{Connection, Result};
use std::path::Path;
use std::time::Duration;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // The shell and the host process may share the file
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_opens() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let _db = Database::open(&db_path).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_all_tables_created() {
        let db = Database::open_in_memory().unwrap();
        migrations::run(db.connection()).unwrap();

        let expected_tables = ["app_preferences", "usage_events"];
        for table in &expected_tables {
            let count: i32 = db
                .connection()
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {table} should exist");
        }
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();

        migrations::run(db.connection()).unwrap();
        db.connection()
            .execute(
                "INSERT INTO app_preferences (package_id, hidden) VALUES ('com.kept', 1)",
                [],
            )
            .unwrap();
        migrations::run(db.connection()).unwrap();

        let count: i32 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM app_preferences", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1, "Running migrations twice should keep existing rows");
    }
}
