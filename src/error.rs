//! Error types for labelbench.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`LabelBenchError`] enum. Numeric corner cases inside the classifiers
//! (zero probabilities, tied neighbors) are resolved in place and never
//! surface here; only structural misuse does.
//!
//! # Examples
//!
//! ```
//! use labelbench::error::{LabelBenchError, Result};
//!
//! fn neighbors(k: usize) -> Result<usize> {
//!     if k == 0 {
//!         return Err(LabelBenchError::invalid_parameter("k must be at least 1"));
//!     }
//!     Ok(k)
//! }
//!
//! assert!(neighbors(0).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for labelbench operations.
#[derive(Error, Debug)]
pub enum LabelBenchError {
    /// Empty or degenerate training data, vocabulary or evaluation input.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A parameter outside its valid range (k, cardinality, smoothing, ...).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Misaligned prediction and ground-truth sequences, or vectors of
    /// different dimensions.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Operation called in the wrong state, e.g. predict before fit.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// I/O errors while reading the corpus or writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A corpus line that is not a valid record.
    #[error("Corpus error at line {line}: {source}")]
    Corpus {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// CSV writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for operations that may fail with LabelBenchError.
pub type Result<T> = std::result::Result<T, LabelBenchError>;

impl LabelBenchError {
    /// Create a new insufficient data error.
    pub fn insufficient_data<S: Into<String>>(msg: S) -> Self {
        LabelBenchError::InsufficientData(msg.into())
    }

    /// Create a new invalid parameter error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        LabelBenchError::InvalidParameter(msg.into())
    }

    /// Create a new shape mismatch error.
    pub fn shape_mismatch<S: Into<String>>(msg: S) -> Self {
        LabelBenchError::ShapeMismatch(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        LabelBenchError::InvalidOperation(msg.into())
    }
}
