use rusqlite::{params, Connection, Result};

/// A foreground interval recorded for a package.
#[derive(Debug, Clone)]
pub struct UsageEvent {
    pub id: Option<i64>,
    pub package_id: String,
    pub started_at_ms: i64,
    pub duration_ms: i64,
}

/// Aggregated usage for one package over a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageTotal {
    pub package_id: String,
    pub total_ms: i64,
    pub last_used_ms: i64,
}

impl UsageEvent {
    pub fn new(package_id: &str, started_at_ms: i64, duration_ms: i64) -> Self {
        Self {
            id: None,
            package_id: package_id.to_string(),
            started_at_ms,
            duration_ms,
        }
    }

    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO usage_events (package_id, started_at_ms, duration_ms) VALUES (?1, ?2, ?3)",
            params![self.package_id, self.started_at_ms, self.duration_ms],
        )?;
        self.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    /// Per-package totals for events starting at or after `since_ms`.
    pub fn usage_since(conn: &Connection, since_ms: i64) -> Result<Vec<UsageTotal>> {
        let mut stmt = conn.prepare(
            "SELECT package_id, SUM(duration_ms) as total, MAX(started_at_ms + duration_ms)
             FROM usage_events
             WHERE started_at_ms >= ?1
             GROUP BY package_id",
        )?;

        let rows = stmt.query_map(params![since_ms], |row| {
            Ok(UsageTotal {
                package_id: row.get(0)?,
                total_ms: row.get(1)?,
                last_used_ms: row.get(2)?,
            })
        })?;

        rows.collect()
    }

    /// Drop events that started before `cutoff_ms`.
    pub fn prune_before(conn: &Connection, cutoff_ms: i64) -> Result<usize> {
        conn.execute(
            "DELETE FROM usage_events WHERE started_at_ms < ?1",
            params![cutoff_ms],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_usage_since_sums_per_package() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let now = 1_700_000_000_000i64;

        UsageEvent::new("com.spotify.music", now, 30_000).save(conn).unwrap();
        UsageEvent::new("com.spotify.music", now + 60_000, 20_000).save(conn).unwrap();
        UsageEvent::new("com.whatsapp", now, 5_000).save(conn).unwrap();

        let totals = UsageEvent::usage_since(conn, now - 10).unwrap();
        let spotify = totals.iter().find(|t| t.package_id == "com.spotify.music").unwrap();
        assert_eq!(spotify.total_ms, 50_000);
        assert_eq!(spotify.last_used_ms, now + 80_000);
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn test_usage_since_excludes_older_events() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let now = 1_700_000_000_000i64;

        UsageEvent::new("com.old", now - 100_000, 1_000).save(conn).unwrap();
        UsageEvent::new("com.new", now, 1_000).save(conn).unwrap();

        let totals = UsageEvent::usage_since(conn, now - 10).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].package_id, "com.new");
    }

    #[test]
    fn test_prune_before() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();

        let mut event = UsageEvent::new("com.a", 100, 10);
        event.save(conn).unwrap();
        assert!(event.id.is_some());
        UsageEvent::new("com.a", 500, 10).save(conn).unwrap();

        assert_eq!(UsageEvent::prune_before(conn, 200).unwrap(), 1);
        let totals = UsageEvent::usage_since(conn, 0).unwrap();
        assert_eq!(totals[0].total_ms, 10);
    }
}
