use crate::constants::{
    DEFAULT_IDLE_GRACE, DEFAULT_MAX_PINNED_APPS, DEFAULT_RETRY_DELAY, USAGE_RETENTION, USAGE_WINDOW,
};
use crate::InitError;
use directories::ProjectDirs;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides the database location.
pub const DB_PATH_ENV: &str = "SAINTJOHN_DB";

#[derive(Debug, Clone)]
pub struct DrawerConfig {
    pub max_pinned_apps: usize,
    pub idle_grace: Duration,
    /// How long to wait before retrying a recompute that failed.
    pub retry_delay: Duration,
    pub usage_window: Duration,
    pub usage_retention: Duration,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            max_pinned_apps: DEFAULT_MAX_PINNED_APPS,
            idle_grace: DEFAULT_IDLE_GRACE,
            retry_delay: DEFAULT_RETRY_DELAY,
            usage_window: USAGE_WINDOW,
            usage_retention: USAGE_RETENTION,
        }
    }
}

/// Resolve the database path, creating the data directory if needed.
pub fn db_path() -> Result<PathBuf, InitError> {
    resolve_db_path(std::env::var_os(DB_PATH_ENV))
}

fn resolve_db_path(override_path: Option<OsString>) -> Result<PathBuf, InitError> {
    if let Some(path) = override_path {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "saintjohn", "SaintJohn").ok_or(InitError::NoProjectDirs)?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(InitError::DataDirCreation)?;
    Ok(data_dir.join("saintjohn.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DrawerConfig::default();
        assert_eq!(config.max_pinned_apps, 6);
        assert_eq!(config.idle_grace, Duration::from_secs(5));
        assert_eq!(config.usage_window, Duration::from_secs(86_400));
        assert!(config.usage_retention > config.usage_window);
    }

    #[test]
    fn test_db_path_override_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.db");
        let resolved = resolve_db_path(Some(path.clone().into_os_string())).unwrap();
        assert_eq!(resolved, path);
    }
}
