//! Error types for the COVID web app

use thiserror::Error;

/// Web app error type
#[derive(Error, Debug)]
pub enum Error {
    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parameter key not known to the receiving component
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
