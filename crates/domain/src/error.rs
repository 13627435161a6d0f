/// Shared error type used across all type modeler crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("{endpoint} returned {status}")]
    Status { endpoint: String, status: u16 },

    #[error("no result received from server")]
    NoResult,

    #[error("remote: {0}")]
    Remote(String),

    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
