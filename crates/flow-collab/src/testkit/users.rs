//! `FakeUserService` — an in-memory test double for `UserService`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use flow_engine::AttrMap;

use crate::error::ServiceError;
use crate::user::{IdentifyFilters, UserRecord, UserService};

/// An in-memory user store keyed by user id, with a secondary index over
/// whatever attribute key each record was seeded to be identified by.
pub struct FakeUserService {
    users: Mutex<HashMap<String, UserRecord>>,
    next_id: Mutex<u64>,
    /// When set, `create_user`/`update_user`/`identify_user` fail with this
    /// error instead of touching `users`.
    pub force_error: Option<ServiceError>,
}

impl Default for FakeUserService {
    fn default() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            next_id: Mutex::new(1),
            force_error: None,
        }
    }
}

impl FakeUserService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: ServiceError) -> Self {
        Self {
            force_error: Some(error),
            ..Self::default()
        }
    }

    /// Seed a user record directly, bypassing `create_user`.
    pub fn seed(&self, user: UserRecord) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserService for FakeUserService {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, ServiceError> {
        if let Some(err) = &self.force_error {
            return Err(err.clone());
        }
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }

    async fn identify_user(
        &self,
        filters: &IdentifyFilters,
    ) -> Result<Option<UserRecord>, ServiceError> {
        if let Some(err) = &self.force_error {
            return Err(err.clone());
        }
        let users = self.users.lock().unwrap();
        let hit = users.values().find(|u| {
            filters.iter().all(|(k, v)| {
                u.attributes
                    .get(k)
                    .map(|attr| attr.as_str().map(|s| s == v).unwrap_or(false))
                    .unwrap_or(false)
            })
        });
        Ok(hit.cloned())
    }

    async fn create_user(
        &self,
        user_type: &str,
        organization_unit_id: &str,
        attributes: AttrMap,
    ) -> Result<UserRecord, ServiceError> {
        if let Some(err) = &self.force_error {
            return Err(err.clone());
        }
        let mut next_id = self.next_id.lock().unwrap();
        let id = format!("user-{}", *next_id);
        *next_id += 1;
        let record = UserRecord {
            id: id.clone(),
            organization_unit_id: organization_unit_id.to_string(),
            user_type: user_type.to_string(),
            attributes,
        };
        self.users.lock().unwrap().insert(id, record.clone());
        Ok(record)
    }

    async fn update_user(
        &self,
        user_id: &str,
        attributes: AttrMap,
    ) -> Result<UserRecord, ServiceError> {
        if let Some(err) = &self.force_error {
            return Err(err.clone());
        }
        let mut users = self.users.lock().unwrap();
        let record = users
            .get_mut(user_id)
            .ok_or_else(|| ServiceError::client("not_found", "user not found"))?;
        for (k, v) in attributes {
            record.attributes.insert(k, v);
        }
        Ok(record.clone())
    }

    async fn update_user_credentials(
        &self,
        user_id: &str,
        _credentials: HashMap<String, String>,
    ) -> Result<(), ServiceError> {
        if let Some(err) = &self.force_error {
            return Err(err.clone());
        }
        if !self.users.lock().unwrap().contains_key(user_id) {
            return Err(ServiceError::client("not_found", "user not found"));
        }
        Ok(())
    }
}
