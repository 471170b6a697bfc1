//! `FakeOAuthService` / `FakeOidcService` — in-memory test doubles for the
//! OAuth/OIDC provider contracts.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use flow_engine::AttrMap;

use crate::error::ServiceError;
use crate::oauth::{AuthorizeUrl, OAuthClientConfig, OAuthService, OidcService, TokenResponse};
use crate::user::UserRecord;

/// One programmable IdP entry.
pub struct FakeIdpEntry {
    pub display_name: String,
    pub config: OAuthClientConfig,
    /// code -> token response this IdP returns on exchange.
    pub codes: HashMap<String, TokenResponse>,
    /// access_token -> userinfo attributes.
    pub userinfo: HashMap<String, AttrMap>,
    /// sub -> already-linked internal user.
    pub linked_users: HashMap<String, UserRecord>,
    /// id_token -> claims, for OIDC.
    pub id_token_claims: HashMap<String, AttrMap>,
}

impl Default for FakeIdpEntry {
    fn default() -> Self {
        Self {
            display_name: "Fake IdP".to_string(),
            config: OAuthClientConfig::default(),
            codes: HashMap::new(),
            userinfo: HashMap::new(),
            linked_users: HashMap::new(),
            id_token_claims: HashMap::new(),
        }
    }
}

pub struct FakeOAuthService {
    pub idps: Mutex<HashMap<String, FakeIdpEntry>>,
}

impl FakeOAuthService {
    pub fn new() -> Self {
        Self {
            idps: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_idp(self, idp_id: impl Into<String>, entry: FakeIdpEntry) -> Self {
        self.idps.lock().unwrap().insert(idp_id.into(), entry);
        self
    }
}

impl Default for FakeOAuthService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OAuthService for FakeOAuthService {
    async fn build_authorize_url(&self, idp_id: &str) -> Result<AuthorizeUrl, ServiceError> {
        let idps = self.idps.lock().unwrap();
        let entry = idps
            .get(idp_id)
            .ok_or_else(|| ServiceError::client("unknown_idp", "identity provider not configured"))?;
        Ok(AuthorizeUrl {
            url: format!("https://fake-idp.test/authorize?idp={idp_id}"),
            idp_display_name: entry.display_name.clone(),
        })
    }

    async fn exchange_code_for_token(
        &self,
        idp_id: &str,
        code: &str,
        _use_pkce: bool,
    ) -> Result<TokenResponse, ServiceError> {
        let idps = self.idps.lock().unwrap();
        let entry = idps
            .get(idp_id)
            .ok_or_else(|| ServiceError::client("unknown_idp", "identity provider not configured"))?;
        entry
            .codes
            .get(code)
            .cloned()
            .ok_or_else(|| ServiceError::client("invalid_grant", "authorization code invalid or expired"))
    }

    async fn fetch_userinfo(
        &self,
        idp_id: &str,
        access_token: &str,
    ) -> Result<AttrMap, ServiceError> {
        let idps = self.idps.lock().unwrap();
        let entry = idps
            .get(idp_id)
            .ok_or_else(|| ServiceError::client("unknown_idp", "identity provider not configured"))?;
        entry
            .userinfo
            .get(access_token)
            .cloned()
            .ok_or_else(|| ServiceError::server("userinfo_fetch_failed", "userinfo endpoint rejected token"))
    }

    async fn get_internal_user(
        &self,
        idp_id: &str,
        sub: &str,
    ) -> Result<Option<UserRecord>, ServiceError> {
        let idps = self.idps.lock().unwrap();
        let entry = idps
            .get(idp_id)
            .ok_or_else(|| ServiceError::client("unknown_idp", "identity provider not configured"))?;
        Ok(entry.linked_users.get(sub).cloned())
    }

    async fn get_oauth_client_config(
        &self,
        idp_id: &str,
    ) -> Result<OAuthClientConfig, ServiceError> {
        let idps = self.idps.lock().unwrap();
        let entry = idps
            .get(idp_id)
            .ok_or_else(|| ServiceError::client("unknown_idp", "identity provider not configured"))?;
        Ok(entry.config.clone())
    }
}

#[async_trait]
impl OidcService for FakeOAuthService {
    async fn get_id_token_claims(&self, id_token: &str) -> Result<AttrMap, ServiceError> {
        let idps = self.idps.lock().unwrap();
        for entry in idps.values() {
            if let Some(claims) = entry.id_token_claims.get(id_token) {
                return Ok(claims.clone());
            }
        }
        Err(ServiceError::client("invalid_id_token", "id token could not be parsed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exchange_returns_configured_token() {
        let mut entry = FakeIdpEntry::default();
        entry.codes.insert(
            "good-code".to_string(),
            TokenResponse {
                access_token: "tok-1".to_string(),
                id_token: None,
            },
        );
        let svc = FakeOAuthService::new().with_idp("github", entry);

        let token = svc
            .exchange_code_for_token("github", "good-code", false)
            .await
            .unwrap();
        assert_eq!(token.access_token, "tok-1");
    }

    #[tokio::test]
    async fn unknown_idp_is_client_error() {
        let svc = FakeOAuthService::new();
        let err = svc.build_authorize_url("nope").await.unwrap_err();
        assert!(err.is_client());
    }
}
