//! Authorization contract consumed by the Authorization executor (§4.7).

use async_trait::async_trait;

use crate::error::ServiceError;

#[async_trait]
pub trait AuthorizationService: Send + Sync {
    /// Resolve which of `requested_permissions` `user_id` (member of
    /// `group_ids`) is actually granted. Returns the granted subset.
    async fn get_authorized_permissions(
        &self,
        user_id: &str,
        group_ids: &[String],
        requested_permissions: &[String],
    ) -> Result<Vec<String>, ServiceError>;
}
