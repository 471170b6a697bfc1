//! Credentials authentication contract consumed by the Basic-Auth executor.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::ServiceError;
use crate::user::UserRecord;

/// Contract for the password/credentials authentication backend.
#[async_trait]
pub trait CredentialsAuthService: Send + Sync {
    /// Authenticate with the given attribute set (typically `username` +
    /// `password`). Returns the resolved user on success; a
    /// `ServiceError::ClientError` for bad credentials; a
    /// `ServiceError::ServerError` for backend failure.
    async fn authenticate(
        &self,
        attributes: &HashMap<String, String>,
    ) -> Result<UserRecord, ServiceError>;
}
