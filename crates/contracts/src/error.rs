//! Layered error definitions
//!
//! Categorized by source: config / anchors / media

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Anchor Errors =====
    /// Not enough matched points to build a trustworthy mapping
    #[error("insufficient anchors: need at least {required} matched points, got {actual}")]
    InsufficientAnchors { required: usize, actual: usize },

    /// Anchor with non-finite or negative time
    #[error("invalid anchor (tA={time_a}, tB={time_b}): {message}")]
    InvalidAnchor {
        time_a: f64,
        time_b: f64,
        message: String,
    },

    /// Attempt to remove a locked lap start/end anchor
    #[error("anchor {index} is locked and cannot be removed")]
    LockedAnchor { index: usize },

    /// Anchor index out of range
    #[error("anchor index {index} out of range (len={len})")]
    AnchorIndex { index: usize, len: usize },

    // ===== Media Errors =====
    /// Media handle missing or unusable
    #[error("media '{source_id}' unavailable: {message}")]
    MediaUnavailable { source_id: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid anchor error
    pub fn invalid_anchor(time_a: f64, time_b: f64, message: impl Into<String>) -> Self {
        Self::InvalidAnchor {
            time_a,
            time_b,
            message: message.into(),
        }
    }

    /// Create media unavailable error
    pub fn media_unavailable(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MediaUnavailable {
            source_id: source_id.into(),
            message: message.into(),
        }
    }
}
