//! Error types for the engine crate.

use thiserror::Error;

/// Errors surfaced by engine components.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("face detector failed: {0}")]
    DetectorFailed(String),
}

impl EngineError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn detector_failed(msg: impl Into<String>) -> Self {
        Self::DetectorFailed(msg.into())
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
