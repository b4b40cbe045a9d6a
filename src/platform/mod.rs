pub mod recorded_usage;
pub mod types;

pub use recorded_usage::RecordedUsageStats;
pub use types::{AppRegistry, LaunchableApp, NoUsageStats, UsageStatsSource, UsageSummary};

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::DesktopEntryRegistry as NativeRegistry;

#[cfg(not(target_os = "linux"))]
use crate::error::PlatformError;

// Stub for development on other platforms
#[cfg(not(target_os = "linux"))]
pub struct NativeRegistry;

#[cfg(not(target_os = "linux"))]
impl NativeRegistry {
    pub fn from_environment() -> Self {
        Self
    }
}

#[cfg(not(target_os = "linux"))]
impl AppRegistry for NativeRegistry {
    fn launchable_packages(&self) -> Result<Vec<String>, PlatformError> {
        Ok(Vec::new())
    }

    fn app_info(&self, package_id: &str) -> Result<LaunchableApp, PlatformError> {
        Err(PlatformError::PackageNotFound(package_id.to_string()))
    }

    fn launch(&self, _package_id: &str) -> bool {
        false
    }
}
