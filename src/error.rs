use thiserror::Error;

/// Errors raised by the OS-facing collaborators.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("package '{0}' is not installed")]
    PackageNotFound(String),

    #[error("malformed entry for '{package}': {reason}")]
    MalformedEntry { package: String, reason: String },

    #[error("registry unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("'{package}' is locked")]
    Locked { package: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl AppError {
    /// Whether the caller may retry the same operation unchanged.
    ///
    /// Persistence failures are reported to the caller of a mutation rather
    /// than swallowed, so they must be distinguishable from bad input.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Database(_) => true,
            AppError::Platform(e) => matches!(e, PlatformError::Unavailable(_) | PlatformError::Io(_)),
            AppError::InvalidInput { .. } | AppError::Locked { .. } => false,
        }
    }
}
