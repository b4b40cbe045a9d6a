pub mod app;
pub mod category;
pub mod preference;
pub mod usage_event;

pub use app::{AppRecord, EffectiveApp};
pub use category::{Category, DeclaredCategory};
pub use preference::PreferenceRecord;
pub use usage_event::{UsageEvent, UsageTotal};

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, saturating on clock skew.
pub fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

pub fn unix_secs() -> i64 {
    unix_millis() / 1000
}
