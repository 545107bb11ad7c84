//! Error types for lodcrate

use thiserror::Error;

/// Main error type for lodcrate operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration rejected before any decimation runs
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Mesh shape violation detected at an API boundary
    #[error("Malformed mesh: {0}")]
    MalformedMesh(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for lodcrate operations
pub type Result<T> = std::result::Result<T, Error>;
