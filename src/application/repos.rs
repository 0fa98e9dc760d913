//! Port traits describing the search index the services read from.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A document as stored in the index: field name to value.
pub type RawDocument = Map<String, Value>;

#[derive(Debug, Error)]
pub enum IndexError {
    /// The index or document does not exist. Callers treat this as an empty result.
    #[error("index resource not found: {0}")]
    NotFound(String),
    #[error("search index unreachable: {0}")]
    Transport(String),
    #[error("search index timeout")]
    Timeout,
    #[error("search index rejected request with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("search index response could not be decoded: {0}")]
    Decode(String),
}

impl IndexError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Run a native search body and return the hit sources in index order.
    async fn search(&self, index: &str, body: &Value) -> Result<Vec<RawDocument>, IndexError>;

    /// Fetch one document by its index identity.
    async fn get(&self, index: &str, id: &str) -> Result<Option<RawDocument>, IndexError>;
}
