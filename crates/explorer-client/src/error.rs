use chain_tbc::error::TbcError;
use thiserror::Error;

/// Explorer client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The explorer answered with JSON of an unexpected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Chain(#[from] TbcError),

    #[error("gave up after {attempts} merge attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}
