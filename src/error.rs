// ⚠️ Error types - remote collaborator, configuration and I/O failures
// Input malformation never reaches this type: the calculators degrade to 0.

use thiserror::Error;

/// Common result type for engine operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure talking to the remote service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote service answered, but with an error status or payload
    #[error("Remote service error: {0}")]
    Remote(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
