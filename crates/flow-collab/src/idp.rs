//! Identity-provider metadata contract.

use async_trait::async_trait;

use crate::error::ServiceError;

/// Metadata describing a configured identity provider.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    pub idp_id: String,
    pub display_name: String,
}

#[async_trait]
pub trait IdpService: Send + Sync {
    async fn get_identity_provider(&self, idp_id: &str) -> Result<IdentityProvider, ServiceError>;
}
