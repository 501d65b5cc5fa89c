//! Error handling for wavsource
//!
//! Every failure of `open` is terminal: the source is either fully loaded
//! or nothing is kept. Missing header metadata is never an error.

use thiserror::Error;

/// Result type alias for wavsource operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Main error type for sample source operations
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Cannot open WAV file: {path}")]
    NoInput {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid WAV file: {reason}")]
    DataFormat {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Cannot load sample buffer: {details}")]
    Resource { details: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sample range out of bounds: {count} frames from index {index} (available: {available})")]
    OutOfRange {
        index: usize,
        count: usize,
        available: usize,
    },

    #[error("Sample source has been closed")]
    Closed,

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl SourceError {
    /// Shorthand for a format error with no underlying cause.
    pub fn data_format(reason: impl Into<String>) -> Self {
        SourceError::DataFormat {
            reason: reason.into(),
            source: None,
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SourceError::NoInput { .. } => "NO_INPUT",
            SourceError::DataFormat { .. } => "DATA_FORMAT",
            SourceError::Resource { .. } => "RESOURCE",
            SourceError::Io(_) => "IO_ERROR",
            SourceError::OutOfRange { .. } => "OUT_OF_RANGE",
            SourceError::Closed => "CLOSED",
            SourceError::Config { .. } => "CONFIG",
        }
    }

    /// Process exit status for this error, following sysexits.h.
    pub fn exit_code(&self) -> i32 {
        match self {
            SourceError::NoInput { .. } => 66,
            SourceError::DataFormat { .. } => 65,
            SourceError::Resource { .. } => 70,
            SourceError::Io(_) => 74,
            SourceError::OutOfRange { .. } | SourceError::Closed => 70,
            SourceError::Config { .. } => 78,
        }
    }
}
