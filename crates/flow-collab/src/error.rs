//! The two-way error taxonomy every collaborator trait in this crate returns.
//!
//! Per spec §6/§7: a collaborator call either succeeds with a typed value or
//! fails with a [`ServiceError`] tagged `ClientError` (attributable to input
//! or provider configuration — executors fold this into a `Failure`
//! response) or `ServerError` (executors propagate this as a transport-level
//! [`flow_engine::ExecutorError`]).

use thiserror::Error;

/// Error returned by a collaborator operation.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// Attributable to the caller's input or to provider configuration.
    /// Executors turn this into `ExecutorResponse::failure(description)`.
    #[error("{description}")]
    ClientError {
        code: String,
        description: String,
    },

    /// Backend/transport failure. Executors propagate this as an
    /// `ExecutorError`, leaving retry policy to the scheduler.
    #[error("server error ({code}): {description}")]
    ServerError {
        code: String,
        description: String,
    },
}

impl ServiceError {
    pub fn client(code: impl Into<String>, description: impl Into<String>) -> Self {
        ServiceError::ClientError {
            code: code.into(),
            description: description.into(),
        }
    }

    pub fn server(code: impl Into<String>, description: impl Into<String>) -> Self {
        ServiceError::ServerError {
            code: code.into(),
            description: description.into(),
        }
    }

    pub fn is_client(&self) -> bool {
        matches!(self, ServiceError::ClientError { .. })
    }

    pub fn description(&self) -> &str {
        match self {
            ServiceError::ClientError { description, .. } => description,
            ServiceError::ServerError { description, .. } => description,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ServiceError::ClientError { code, .. } => code,
            ServiceError::ServerError { code, .. } => code,
        }
    }
}

/// Convert a `ServiceError` into the `ExecutorError` a propagated (non-
/// `Failure`) outcome carries. Only meaningful for `ServerError` — callers
/// should fold `ClientError` into `ExecutorResponse::failure` instead of
/// calling this.
impl From<ServiceError> for flow_engine::ExecutorError {
    fn from(err: ServiceError) -> Self {
        flow_engine::ExecutorError::CollaboratorServerError(err.description().to_string())
    }
}
