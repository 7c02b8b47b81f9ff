//! Error taxonomy for the public engine API.
//!
//! Startup-time configuration problems ([`EngineError::Config`],
//! [`EngineError::DimensionMismatch`], [`EngineError::InvalidWeights`]) are
//! fatal. Request-level problems ([`EngineError::EmptyQuery`],
//! [`EngineError::ProfileNotFound`]) reject a single call. Failures of
//! external calls inside a request are never surfaced here; they are
//! recovered where they happen.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("weight profile '{profile}' sums to {sum:.6}, expected 1.0")]
    InvalidWeights { profile: &'static str, sum: f64 },

    #[error("query text must not be empty")]
    EmptyQuery,

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl EngineError {
    /// `true` for errors that should stop the process at startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::DimensionMismatch { .. } | Self::InvalidWeights { .. }
        )
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
