use crate::error::PlatformError;
use crate::models::DeclaredCategory;
use std::collections::HashMap;
use std::time::Duration;

/// What the OS registry reports for one launchable app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchableApp {
    pub package_id: String,
    pub label: String,
    pub icon: Option<String>,
    pub declared_category: Option<DeclaredCategory>,
    pub is_system: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageSummary {
    pub foreground_ms: u64,
    pub last_used: Option<i64>,
}

pub trait AppRegistry: Send + Sync {
    /// Identifiers of every app with a user-startable entry point.
    fn launchable_packages(&self) -> Result<Vec<String>, PlatformError>;

    /// Describe one app. Failures here affect only that entry.
    fn app_info(&self, package_id: &str) -> Result<LaunchableApp, PlatformError>;

    /// Fire-and-forget launch. Returns whether the start request was accepted.
    fn launch(&self, package_id: &str) -> bool;
}

pub trait UsageStatsSource: Send + Sync {
    fn has_permission(&self) -> bool;

    /// Foreground usage per package over the trailing `window`.
    /// Returns an empty map when permission has not been granted.
    fn usage_in_window(&self, window: Duration) -> HashMap<String, UsageSummary>;
}

/// Usage source for when the usage-stats permission is not granted.
pub struct NoUsageStats;

impl UsageStatsSource for NoUsageStats {
    fn has_permission(&self) -> bool {
        false
    }

    fn usage_in_window(&self, _window: Duration) -> HashMap<String, UsageSummary> {
        HashMap::new()
    }
}
