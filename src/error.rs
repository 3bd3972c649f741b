use thiserror::Error;

use crate::host::HostError;
use crate::relocator::RelocateError;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown setting '{key}'")]
    UnknownSetting { key: String },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Failed to relocate replay: {0}")]
    Relocate(#[from] RelocateError),
}

// For tray callbacks and CLI output
impl From<AppError> for String {
    fn from(e: AppError) -> Self {
        e.to_string()
    }
}
