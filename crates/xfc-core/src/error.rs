//! Unified error type for transformer conversion
//!
//! Every fatal condition raised while converting a single transformer maps to
//! [`XfcError`]. Recoverable conditions are never errors; they are recorded in
//! [`crate::Diagnostics`] and the conversion continues.
//!
//! # Example
//!
//! ```ignore
//! use xfc_core::{XfcError, XfcResult};
//!
//! fn check_rated_u(value: f64) -> XfcResult<()> {
//!     if value <= 0.0 {
//!         return Err(XfcError::malformed("T1", "rated voltage must be positive"));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Error type for all conversion operations.
#[derive(Error, Debug)]
pub enum XfcError {
    /// Input data violates a model invariant (non-positive rated voltage, bad tap step, ...).
    /// Fatal for the transformer being converted, never for a batch.
    #[error("Malformed input for {entity}: {reason}")]
    MalformedInput { entity: String, reason: String },

    /// A configuration that cannot be represented by the closed policy enums.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

impl XfcError {
    /// Shorthand for [`XfcError::MalformedInput`].
    pub fn malformed(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        XfcError::MalformedInput {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// True when the error only concerns the transformer that produced it.
    pub fn is_per_transformer(&self) -> bool {
        matches!(self, XfcError::MalformedInput { .. })
    }
}

/// Convenience type alias for Results using XfcError.
pub type XfcResult<T> = Result<T, XfcError>;

impl From<anyhow::Error> for XfcError {
    fn from(err: anyhow::Error) -> Self {
        XfcError::Other(err.to_string())
    }
}

impl From<String> for XfcError {
    fn from(s: String) -> Self {
        XfcError::Other(s)
    }
}

impl From<&str> for XfcError {
    fn from(s: &str) -> Self {
        XfcError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for XfcError {
    fn from(err: serde_json::Error) -> Self {
        XfcError::Parse(err.to_string())
    }
}
