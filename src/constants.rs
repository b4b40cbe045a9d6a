// src/constants.rs

use std::time::Duration;

/// Milliseconds in one day (24 * 60 * 60 * 1000)
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Trailing window for usage-duration queries
pub const USAGE_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// How long recorded usage events are kept before pruning
pub const USAGE_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Maximum number of apps shown in the pinned shortcut row
pub const DEFAULT_MAX_PINNED_APPS: usize = 6;

/// Grace period before an unobserved drawer stops recomputing
pub const DEFAULT_IDLE_GRACE: Duration = Duration::from_secs(5);

/// Delay before a failed drawer recompute is retried
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Maximum package identifier length
pub const MAX_PACKAGE_ID_LEN: usize = 255;

/// Maximum single usage report (one day)
pub const MAX_USAGE_REPORT_MS: i64 = MILLIS_PER_DAY;

/// Host protocol frame limit (1 MiB)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;
