use super::{unix_secs, Category};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

/// Persisted per-package customization. Absent fields mean "use the default".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceRecord {
    pub package_id: String,
    pub category_override: Option<Category>,
    pub hidden: bool,
    pub locked: bool,
    pub pinned: bool,
    pub force_color: bool,
    pub updated_at: i64,
}

const COLUMNS: &str = "package_id, category, hidden, locked, pinned, force_color, updated_at";

impl PreferenceRecord {
    /// A record with no override and every flag cleared.
    pub fn new(package_id: &str) -> Self {
        Self {
            package_id: package_id.to_string(),
            category_override: None,
            hidden: false,
            locked: false,
            pinned: false,
            force_color: false,
            updated_at: 0,
        }
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let package_id: String = row.get(0)?;
        let category: Option<String> = row.get(1)?;
        let category_override = category.and_then(|raw| {
            let parsed = Category::parse(&raw);
            if parsed.is_none() {
                warn!("Ignoring unknown category '{raw}' stored for {package_id}");
            }
            parsed
        });

        Ok(Self {
            package_id,
            category_override,
            hidden: row.get(2)?,
            locked: row.get(3)?,
            pinned: row.get(4)?,
            force_color: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM app_preferences ORDER BY package_id"
        ))?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect()
    }

    pub fn find(conn: &Connection, package_id: &str) -> Result<Option<Self>> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM app_preferences WHERE package_id = ?1"),
            params![package_id],
            Self::from_row,
        )
        .optional()
    }

    /// Insert or replace the row for this package, stamping `updated_at`.
    pub fn upsert(&mut self, conn: &Connection) -> Result<()> {
        self.updated_at = unix_secs();
        conn.execute(
            "INSERT INTO app_preferences (package_id, category, hidden, locked, pinned, force_color, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(package_id) DO UPDATE SET
                category = excluded.category,
                hidden = excluded.hidden,
                locked = excluded.locked,
                pinned = excluded.pinned,
                force_color = excluded.force_color,
                updated_at = excluded.updated_at",
            params![
                self.package_id,
                self.category_override.map(Category::as_str),
                self.hidden,
                self.locked,
                self.pinned,
                self.force_color,
                self.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Delete the rows for the given packages in one transaction. Returns how
    /// many were removed.
    pub fn delete_many(conn: &Connection, package_ids: &[&str]) -> Result<usize> {
        let tx = conn.unchecked_transaction()?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM app_preferences WHERE package_id = ?1")?;
            for package_id in package_ids {
                removed += stmt.execute(params![package_id])?;
            }
        }
        tx.commit()?;
        Ok(removed)
    }
}
