//! `OAuthCore` — the shared authorize/exchange/JIT-resolution logic behind
//! every member of the OAuth/OIDC executor family (§4.5, §9 composition
//! note). `OAuthExecutor` and `OidcExecutor` each hold one of these by value
//! instead of inheriting from a shared base class; only the subject/claim
//! extraction step (ID token vs. userinfo) differs between them.

use std::collections::HashMap;
use std::sync::Arc;

use flow_collab::{OAuthClientConfig, OAuthService, UserService};
use flow_engine::{
    ApplicationView, AttrMap, AttrValue, AuthenticatedUser, ExecutorError, ExecutorResponse,
    FlowType, NodeContext,
};

use crate::try_service;
use crate::util::filter_out;

/// Claims that never belong in a provisioned/authenticated user's attribute
/// set because they describe the token itself, not the subject (§4.5 step
/// 5, §8 "ID-token claim filter").
pub const CLAIM_DENYLIST: &[&str] = &["aud", "exp", "iat", "iss", "at_hash", "azp", "nonce", "sub"];

/// Userinfo keys dropped when merging into the attribute set (they either
/// duplicate the subject or are better sourced from claims).
pub const USERINFO_SKIP: &[&str] = &["username", "sub", "id"];

/// One resolved identity coming out of either the OIDC ID-token path or the
/// plain-OAuth userinfo path, ready for [`OAuthCore::finish`].
pub struct ResolvedAuth {
    pub sub: String,
    pub attributes: AttrMap,
}

pub struct OAuthCore {
    pub oauth: Arc<dyn OAuthService>,
    pub users: Arc<dyn UserService>,
}

impl OAuthCore {
    pub fn new(oauth: Arc<dyn OAuthService>, users: Arc<dyn UserService>) -> Self {
        Self { oauth, users }
    }

    pub fn idp_id<'a>(&self, ctx: &'a NodeContext) -> Result<&'a str, ExecutorError> {
        match ctx.property("idpId").and_then(AttrValue::as_str) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ExecutorError::Configuration("missing idpId".into())),
        }
    }

    pub fn use_pkce(&self, ctx: &NodeContext) -> bool {
        matches!(ctx.property("usePKCE"), Some(AttrValue::Bool(true)))
    }

    /// `BuildAuthorizeFlow`: no `code` input yet — redirect to the IdP.
    pub async fn build_authorize_flow(&self, idp_id: &str) -> Result<ExecutorResponse, ExecutorError> {
        let authorize = try_service!(self.oauth.build_authorize_url(idp_id).await);
        let mut resp = ExecutorResponse::external_redirection(authorize.url);
        resp.additional_data
            .insert("idpDisplayName".to_string(), authorize.idp_display_name);
        Ok(resp)
    }

    pub async fn client_config(&self, idp_id: &str) -> Result<OAuthClientConfig, ExecutorError> {
        Ok(try_service!(self.oauth.get_oauth_client_config(idp_id).await))
    }

    /// `ProcessAuthFlowResponse`'s shared tail: resolve the internal user by
    /// subject and branch by found/not-found × flow type, then promote
    /// `email` into `RuntimeData`.
    pub async fn finish(
        &self,
        ctx: &NodeContext,
        idp_id: &str,
        config: &OAuthClientConfig,
        resolved: ResolvedAuth,
    ) -> Result<ExecutorResponse, ExecutorError> {
        let mut base_runtime = HashMap::new();
        if let Some(email) = resolved.attributes.get("email").and_then(AttrValue::as_str) {
            if !email.is_empty() {
                base_runtime.insert("email".to_string(), email.to_string());
            }
        }

        let internal_user = try_service!(self.oauth.get_internal_user(idp_id, &resolved.sub).await);

        let mut resp = match (internal_user, ctx.flow_type) {
            (Some(user), FlowType::Authentication) => ExecutorResponse::complete()
                .with_authenticated_user(
                    AuthenticatedUser::authenticated(user.id)
                        .with_organization_unit_id(user.organization_unit_id)
                        .with_user_type(user.user_type)
                        .with_attributes(user.attributes),
                ),
            (Some(user), FlowType::Registration) if config.allow_registration_with_existing_user => {
                let mut r = ExecutorResponse::complete().with_authenticated_user(
                    AuthenticatedUser::authenticated(user.id)
                        .with_organization_unit_id(user.organization_unit_id)
                        .with_user_type(user.user_type)
                        .with_attributes(user.attributes),
                );
                r.runtime_data.insert("skipProvisioning".to_string(), "true".to_string());
                r
            }
            (Some(_), FlowType::Registration) => {
                return Ok(ExecutorResponse::failure(
                    "User already exists with the provided attributes.",
                ))
            }
            (None, FlowType::Registration) => {
                let mut attrs = resolved.attributes.clone();
                attrs.insert("sub".to_string(), AttrValue::from(resolved.sub.as_str()));
                let mut r = ExecutorResponse::complete()
                    .with_authenticated_user(AuthenticatedUser::unauthenticated().with_attributes(attrs));
                r.runtime_data.insert("sub".to_string(), resolved.sub.clone());
                r
            }
            (None, FlowType::Authentication) if config.allow_authentication_without_local_user => {
                if self_registration_candidates(&ctx.application) == 1 {
                    let mut r = ExecutorResponse::complete().with_authenticated_user(
                        AuthenticatedUser::unauthenticated().with_attributes(resolved.attributes.clone()),
                    );
                    r.runtime_data
                        .insert("userEligibleForProvisioning".to_string(), "true".to_string());
                    r
                } else {
                    return Ok(ExecutorResponse::failure("User not found"));
                }
            }
            (None, FlowType::Authentication) => {
                return Ok(ExecutorResponse::failure("User not found"))
            }
        };

        for (k, v) in base_runtime {
            resp.runtime_data.entry(k).or_insert(v);
        }
        Ok(resp)
    }
}

fn self_registration_candidates(app: &ApplicationView) -> usize {
    app.allowed_user_types
        .iter()
        .filter(|t| t.allow_self_registration && t.default_ou_id.is_some())
        .count()
}

/// Filter ID-token claims through [`CLAIM_DENYLIST`].
pub fn filter_claims(claims: &AttrMap) -> AttrMap {
    filter_out(claims, CLAIM_DENYLIST)
}

/// Filter a userinfo response through [`USERINFO_SKIP`] before merging.
pub fn filter_userinfo(userinfo: &AttrMap) -> AttrMap {
    filter_out(userinfo, USERINFO_SKIP)
}
