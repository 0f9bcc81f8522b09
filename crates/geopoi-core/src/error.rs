use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The relational store is unreachable or rejected a query.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Vector store error: {0}")]
    Vector(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Deadline exceeded after {0} ms")]
    DeadlineExceeded(u128),
}

impl Error {
    /// Errors that mean the semantic path should be abandoned for this call.
    pub fn is_semantic(&self) -> bool {
        matches!(self, Error::Vector(_) | Error::Embedding(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
