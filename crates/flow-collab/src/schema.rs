//! User-schema contract consumed by the User-Type-Resolver executor (§4.10).

use async_trait::async_trait;

use crate::error::ServiceError;

/// The subset of a user schema's configuration the flow core needs.
#[derive(Debug, Clone)]
pub struct UserSchema {
    pub organization_unit_id: Option<String>,
    pub allow_self_registration: bool,
}

#[async_trait]
pub trait UserSchemaService: Send + Sync {
    async fn get_user_schema_by_name(&self, name: &str) -> Result<UserSchema, ServiceError>;
}
