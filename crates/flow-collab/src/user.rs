//! User-store contract: `GetUser`, `IdentifyUser`, `CreateUser`, `UpdateUser`,
//! `UpdateUserCredentials`.

use async_trait::async_trait;
use std::collections::HashMap;

use flow_engine::AttrMap;

use crate::error::ServiceError;

/// A user record as the user store returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub organization_unit_id: String,
    pub user_type: String,
    pub attributes: AttrMap,
}

/// Filter criteria for `identify_user`: an arbitrary set of attribute
/// key/value pairs (e.g. `{"username": "alice"}`, `{"mobile_number": "+1…"}`).
pub type IdentifyFilters = HashMap<String, String>;

/// Contract for the user store.
///
/// `identify_user` and `get_user` return `Ok(None)` for "not found" — that is
/// a normal, successful query outcome executors branch on explicitly, not an
/// error. `Err(ServiceError)` is reserved for genuine backend failure.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, ServiceError>;

    async fn identify_user(
        &self,
        filters: &IdentifyFilters,
    ) -> Result<Option<UserRecord>, ServiceError>;

    async fn create_user(
        &self,
        user_type: &str,
        organization_unit_id: &str,
        attributes: AttrMap,
    ) -> Result<UserRecord, ServiceError>;

    async fn update_user(
        &self,
        user_id: &str,
        attributes: AttrMap,
    ) -> Result<UserRecord, ServiceError>;

    async fn update_user_credentials(
        &self,
        user_id: &str,
        credentials: HashMap<String, String>,
    ) -> Result<(), ServiceError>;
}
