//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Session file not found
    #[error("Session file not found: {path}")]
    SessionNotFound { path: String },

    /// Timestamp argument outside the lap timeline
    #[error("Invalid timestamp {value}: must be finite and >= 0")]
    InvalidTime { value: f64 },

    /// Argument out of range
    #[error("Invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    /// Sync loop failure
    #[error("Simulation failed: {message}")]
    Simulation { message: String },

    /// Library error
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}

impl CliError {
    pub fn session_not_found(path: impl Into<String>) -> Self {
        Self::SessionNotFound { path: path.into() }
    }

    pub fn invalid_time(value: f64) -> Self {
        Self::InvalidTime { value }
    }

    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn simulation(message: impl Into<String>) -> Self {
        Self::Simulation {
            message: message.into(),
        }
    }
}
