//! Error types for packing generation, analysis and export.

use thiserror::Error;

/// Result type alias for spherepack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, analysing or persisting a packing.
#[derive(Debug, Error)]
pub enum Error {
    /// Cross sections or surface estimates were requested without any spheres.
    #[error("cannot position spheres in the domain: the sphere list is empty")]
    EmptySphereList,

    /// A configuration value violates a numeric precondition.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An outer radius would drop below the fixed inner radius.
    #[error("outer radius {outer} is smaller than inner radius {inner}")]
    RadiusBelowInner { inner: f64, outer: f64 },

    /// A sphere list row could not be parsed.
    #[error("malformed sphere list at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse { line, message: message.into() }
    }
}
