//! `FakeIdpService` — an in-memory test double for `IdpService`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ServiceError;
use crate::idp::{IdentityProvider, IdpService};

pub struct FakeIdpService {
    providers: Mutex<HashMap<String, IdentityProvider>>,
}

impl FakeIdpService {
    pub fn new() -> Self {
        Self {
            providers: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_provider(self, idp: IdentityProvider) -> Self {
        self.providers.lock().unwrap().insert(idp.idp_id.clone(), idp);
        self
    }
}

impl Default for FakeIdpService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdpService for FakeIdpService {
    async fn get_identity_provider(&self, idp_id: &str) -> Result<IdentityProvider, ServiceError> {
        self.providers
            .lock()
            .unwrap()
            .get(idp_id)
            .cloned()
            .ok_or_else(|| ServiceError::client("unknown_idp", "identity provider not configured"))
    }
}
