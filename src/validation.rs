use crate::constants::{MAX_PACKAGE_ID_LEN, MAX_USAGE_REPORT_MS};
use crate::error::AppError;

/// Validate a package identifier.
pub fn validate_package_id(package_id: &str) -> Result<&str, AppError> {
    if package_id.is_empty() {
        return Err(AppError::InvalidInput {
            field: "package",
            reason: "cannot be empty".into(),
        });
    }
    if package_id.len() > MAX_PACKAGE_ID_LEN {
        return Err(AppError::InvalidInput {
            field: "package",
            reason: format!("cannot exceed {MAX_PACKAGE_ID_LEN} characters"),
        });
    }
    if package_id.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidInput {
            field: "package",
            reason: "cannot contain whitespace".into(),
        });
    }
    if package_id.contains(['/', '\\']) || package_id.contains("..") {
        return Err(AppError::InvalidInput {
            field: "package",
            reason: "cannot contain path separators or '..'".into(),
        });
    }
    Ok(package_id)
}

/// Validate a reported foreground interval.
pub fn validate_usage_report(started_at_ms: i64, duration_ms: i64) -> Result<(), AppError> {
    if started_at_ms < 0 {
        return Err(AppError::InvalidInput {
            field: "started_at_ms",
            reason: "cannot be negative".into(),
        });
    }
    if !(0..=MAX_USAGE_REPORT_MS).contains(&duration_ms) {
        return Err(AppError::InvalidInput {
            field: "duration_ms",
            reason: format!("must be 0-{MAX_USAGE_REPORT_MS}"),
        });
    }
    Ok(())
}
