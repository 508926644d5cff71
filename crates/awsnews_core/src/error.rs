use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Unsupported domain: {0}")]
    UnsupportedDomain(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True for failures caused by the caller's arguments rather than by a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidArgument(_) | Error::UnsupportedDomain(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
