//! OAuth/OIDC provider contracts consumed by the OAuth/OIDC executor family
//! (§4.5): authorization-URL construction, code exchange, userinfo, and
//! subject resolution. `OidcService` extends `OAuthService` with the
//! ID-token claim step, mirroring the "OAuth + ID token" composition the
//! executor layer itself uses (§9).

use async_trait::async_trait;

use flow_engine::AttrMap;

use crate::error::ServiceError;
use crate::user::UserRecord;

/// Result of building an authorization redirect for an IdP.
#[derive(Debug, Clone)]
pub struct AuthorizeUrl {
    pub url: String,
    pub idp_display_name: String,
}

/// Result of exchanging an authorization code for tokens.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    /// Present only for OIDC exchanges.
    pub id_token: Option<String>,
}

/// The subset of an IdP's OAuth client configuration executors need.
#[derive(Debug, Clone, Default)]
pub struct OAuthClientConfig {
    pub scopes: Vec<String>,
    pub allow_registration_with_existing_user: bool,
    pub allow_authentication_without_local_user: bool,
}

/// Contract for an OAuth provider.
#[async_trait]
pub trait OAuthService: Send + Sync {
    async fn build_authorize_url(&self, idp_id: &str) -> Result<AuthorizeUrl, ServiceError>;

    async fn exchange_code_for_token(
        &self,
        idp_id: &str,
        code: &str,
        use_pkce: bool,
    ) -> Result<TokenResponse, ServiceError>;

    async fn fetch_userinfo(
        &self,
        idp_id: &str,
        access_token: &str,
    ) -> Result<AttrMap, ServiceError>;

    /// Resolve the internal user already linked to this IdP subject, if any.
    async fn get_internal_user(
        &self,
        idp_id: &str,
        sub: &str,
    ) -> Result<Option<UserRecord>, ServiceError>;

    async fn get_oauth_client_config(
        &self,
        idp_id: &str,
    ) -> Result<OAuthClientConfig, ServiceError>;
}

/// Contract for an OIDC provider: an `OAuthService` plus ID-token claim
/// extraction.
#[async_trait]
pub trait OidcService: OAuthService {
    async fn get_id_token_claims(&self, id_token: &str) -> Result<AttrMap, ServiceError>;
}
