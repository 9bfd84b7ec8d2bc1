//! Error types for SCRIP grid operations.

use thiserror::Error;

/// Errors that can occur while deriving or persisting a SCRIP grid.
#[derive(Error, Debug)]
pub enum ScripError {
    /// Center arrays are not 2D, have mismatched shapes, or fail the
    /// configured aspect-ratio precondition.
    #[error("invalid grid shape: {0}")]
    InvalidShape(String),

    /// Mask contains values outside {0, 1} under a strict mask policy.
    #[error("invalid grid mask: {0}")]
    InvalidMask(String),

    /// Missing required variable, dimension or attribute.
    #[error("missing required data: {0}")]
    MissingData(String),

    /// File content does not follow the expected layout.
    #[error("invalid data format: {0}")]
    InvalidFormat(String),

    /// NetCDF library error.
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ScripError {
    /// Create an InvalidShape error.
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    /// Create a MissingData error.
    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingData(msg.into())
    }
}

/// Result type for SCRIP grid operations.
pub type Result<T> = std::result::Result<T, ScripError>;
