//! `FakeCredentialsAuthService` — an in-memory test double for
//! `CredentialsAuthService`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::credentials::CredentialsAuthService;
use crate::error::ServiceError;
use crate::user::UserRecord;

pub struct FakeCredentialsAuthService {
    /// username -> (password, resolved user)
    accounts: HashMap<String, (String, UserRecord)>,
    pub calls: Mutex<Vec<HashMap<String, String>>>,
}

impl FakeCredentialsAuthService {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_account(mut self, username: impl Into<String>, password: impl Into<String>, user: UserRecord) -> Self {
        self.accounts.insert(username.into(), (password.into(), user));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for FakeCredentialsAuthService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialsAuthService for FakeCredentialsAuthService {
    async fn authenticate(
        &self,
        attributes: &HashMap<String, String>,
    ) -> Result<UserRecord, ServiceError> {
        self.calls.lock().unwrap().push(attributes.clone());

        let username = attributes
            .get("username")
            .ok_or_else(|| ServiceError::client("missing_username", "username is required"))?;
        let password = attributes
            .get("password")
            .ok_or_else(|| ServiceError::client("missing_password", "password is required"))?;

        match self.accounts.get(username) {
            Some((expected, user)) if expected == password => Ok(user.clone()),
            Some(_) => Err(ServiceError::client("invalid_credentials", "invalid username or password")),
            None => Err(ServiceError::client("invalid_credentials", "invalid username or password")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_engine::AttrMap;

    #[tokio::test]
    async fn matching_password_authenticates() {
        let user = UserRecord {
            id: "user-1".into(),
            organization_unit_id: "ou-1".into(),
            user_type: "customer".into(),
            attributes: AttrMap::new(),
        };
        let svc = FakeCredentialsAuthService::new().with_account("alice", "hunter2", user);

        let mut attrs = HashMap::new();
        attrs.insert("username".to_string(), "alice".to_string());
        attrs.insert("password".to_string(), "hunter2".to_string());

        let result = svc.authenticate(&attrs).await.unwrap();
        assert_eq!(result.id, "user-1");
        assert_eq!(svc.call_count(), 1);
    }

    #[tokio::test]
    async fn wrong_password_is_client_error() {
        let user = UserRecord {
            id: "user-1".into(),
            organization_unit_id: "ou-1".into(),
            user_type: "customer".into(),
            attributes: AttrMap::new(),
        };
        let svc = FakeCredentialsAuthService::new().with_account("alice", "hunter2", user);

        let mut attrs = HashMap::new();
        attrs.insert("username".to_string(), "alice".to_string());
        attrs.insert("password".to_string(), "wrong".to_string());

        let err = svc.authenticate(&attrs).await.unwrap_err();
        assert!(err.is_client());
    }
}
