//! Error types for corefine.

use thiserror::Error;

/// Result type for corefine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for corefine operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration (unknown sieve name, malformed ordering
    /// constraint, empty sieve list). These fail fast at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input document or mention candidate.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Scoring error.
    #[error("Scoring error: {0}")]
    Scoring(String),

    /// A sieve-ordering scoring job failed.
    #[error("Optimizer job failed: {0}")]
    Job(String),

    /// A sieve-ordering scoring job did not finish within its deadline.
    #[error("Optimizer job timed out after {0:?}")]
    JobTimeout(std::time::Duration),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a scoring error.
    pub fn scoring(msg: impl Into<String>) -> Self {
        Error::Scoring(msg.into())
    }

    /// Create a job error.
    pub fn job(msg: impl Into<String>) -> Self {
        Error::Job(msg.into())
    }
}
