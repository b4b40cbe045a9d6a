use super::{UsageStatsSource, UsageSummary};
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::{unix_millis, UsageEvent};
use log::warn;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Usage stats derived from intervals reported to the launcher itself.
///
/// Used where the OS exposes no usage-stats API. Reading always succeeds:
/// a database failure is logged and reported as "no data".
pub struct RecordedUsageStats {
    db: Arc<Mutex<Database>>,
}

impl RecordedUsageStats {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    pub fn record(&self, package_id: &str, started_at_ms: i64, duration_ms: i64) -> Result<(), AppError> {
        let mut event = UsageEvent::new(package_id, started_at_ms, duration_ms);
        with_connection(&self.db, "record usage", |conn| event.save(conn))
    }

    /// Delete events older than `retention`. Returns the number removed.
    pub fn prune(&self, retention: Duration) -> Result<usize, AppError> {
        let cutoff = unix_millis().saturating_sub(duration_millis(retention));
        with_connection(&self.db, "prune usage", |conn| UsageEvent::prune_before(conn, cutoff))
    }
}

fn duration_millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

impl UsageStatsSource for RecordedUsageStats {
    fn has_permission(&self) -> bool {
        true
    }

    fn usage_in_window(&self, window: Duration) -> HashMap<String, UsageSummary> {
        let since = unix_millis().saturating_sub(duration_millis(window));
        match with_connection(&self.db, "load usage", |conn| UsageEvent::usage_since(conn, since)) {
            Ok(totals) => totals
                .into_iter()
                .map(|t| {
                    let summary = UsageSummary {
                        foreground_ms: u64::try_from(t.total_ms).unwrap_or(0),
                        last_used: Some(t.last_used_ms),
                    };
                    (t.package_id, summary)
                })
                .collect(),
            Err(e) => {
                warn!("Usage stats unavailable: {e}");
                HashMap::new()
            }
        }
    }
}
