use std::error::Error as StdError;

use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::{
    application::{pagination::PaginationError, query::QueryError, repos::IndexError},
    domain::error::DomainError,
    infra::error::InfraError,
};

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failure of a read operation.
///
/// An absent entity is not an error: services return `None` or an empty list.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed and no I/O was attempted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The index failed for a reason other than the resource not existing.
    #[error(transparent)]
    Index(#[from] IndexError),
    /// Stored data contradicts itself, e.g. a film names a genre the genre index lacks.
    #[error("data integrity violation: {message}")]
    DataIntegrity { message: String },
}

impl ServiceError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity {
            message: message.into(),
        }
    }

    /// Whether retrying the same call might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Index(_))
    }
}

impl From<PaginationError> for ServiceError {
    fn from(error: PaginationError) -> Self {
        Self::InvalidArgument(error.to_string())
    }
}

impl From<QueryError> for ServiceError {
    fn from(error: QueryError) -> Self {
        Self::InvalidArgument(error.to_string())
    }
}

impl From<DomainError> for ServiceError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Validation { message } => Self::InvalidArgument(message),
            DomainError::Invariant { message } => Self::DataIntegrity { message },
        }
    }
}

/// Process-level failure reported once by the binary before exiting.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_errors_are_invalid_arguments() {
        let err: ServiceError = PaginationError::PageSize(0).into();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn index_failures_are_retryable() {
        let err: ServiceError = IndexError::Timeout.into();
        assert!(err.is_retryable());
    }

    #[test]
    fn domain_invariants_become_integrity_errors() {
        let err: ServiceError = DomainError::invariant("genre mismatch").into();
        assert!(matches!(err, ServiceError::DataIntegrity { .. }));
    }

    #[test]
    fn app_errors_display_their_cause() {
        let infra = AppError::from(InfraError::configuration("elastic url has no host"));
        assert_eq!(
            infra.to_string(),
            "configuration error: elastic url has no host"
        );

        let unexpected = AppError::unexpected("failed to load configuration");
        assert_eq!(
            unexpected.to_string(),
            "unexpected error: failed to load configuration"
        );
    }
}
