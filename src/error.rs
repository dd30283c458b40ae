//! Error types for powderopt.
//!
//! Deterministic math has no transient-failure concept: kernel and
//! model errors are never retried, and no partial results are returned
//! on error. Validation errors are collected into message lists by the
//! configuration layer instead of being raised one at a time.

use thiserror::Error;

/// Result type alias for powderopt operations.
pub type PowderResult<T> = Result<T, PowderError>;

/// Unified error type for all powderopt operations.
#[derive(Debug, Error)]
pub enum PowderError {
    // ===== Kernel invariant violations =====
    /// Matrix operation given non-conformant operand dimensions.
    #[error("shape mismatch in {op}: {left_rows}x{left_cols} vs {right_rows}x{right_cols}")]
    ShapeMismatch {
        /// Kernel operation that was attempted.
        op: &'static str,
        /// Rows of the left operand.
        left_rows: usize,
        /// Columns of the left operand.
        left_cols: usize,
        /// Rows of the right operand.
        right_rows: usize,
        /// Columns of the right operand.
        right_cols: usize,
    },

    /// Elimination pivot fell below the singularity threshold.
    #[error("singular matrix: pivot {pivot:.6e} below threshold in column {column}")]
    SingularMatrix {
        /// Absolute value of the offending pivot after row selection.
        pivot: f64,
        /// Pivot column at which elimination failed.
        column: usize,
    },

    // ===== Input errors =====
    /// Caller-supplied parameter outside its documented bounds.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the violated bound.
        message: String,
    },

    // ===== Configuration errors =====
    /// Invalid configuration value.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Schema validation error.
    #[error("validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PowderError {
    /// Create an invalid-input error with a message.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error signals an internal invariant violation.
    ///
    /// ShapeMismatch and SingularMatrix cannot occur for the fixed 5x5
    /// domain with a valid sub-stochastic matrix; seeing one means the
    /// model constants were corrupted, not that the caller misused the
    /// API.
    #[must_use]
    pub const fn is_internal_invariant(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. } | Self::SingularMatrix { .. }
        )
    }
}
