//! Error types for strain field generation.
//!
//! This module provides the structured error type surfaced by the strain
//! filter, together with the crate-wide `Result` alias.

use thiserror::Error;

/// Main error type for strain field generation.
#[derive(Error, Debug)]
pub enum StrainError {
    /// Configuration is incomplete or inconsistent at `generate` entry
    /// (missing transform, zero-sized axis, non-positive spacing,
    /// non-orthonormal direction).
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// The transform reported failure while evaluating a Jacobian.
    #[error("Transform error: {0}")]
    Transform(String),

    /// Numerical failure at a sample, raised only in strict mode.
    #[error("Numeric error: {0}")]
    Numeric(String),

    /// Cooperative cancellation was requested during generation.
    #[error("Generation cancelled")]
    Cancelled,
}

/// Result type for strain field operations.
pub type Result<T> = std::result::Result<T, StrainError>;

impl StrainError {
    /// Create a precondition error.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a transform error.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Create a numeric error.
    pub fn numeric(msg: impl Into<String>) -> Self {
        Self::Numeric(msg.into())
    }
}
