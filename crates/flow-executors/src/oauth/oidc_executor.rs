//! `OidcExecutor` — OAuth plus an ID-token step (§4.5, §9: composition, not
//! inheritance). Holds an `OAuthCore` for the shared plumbing and an
//! `Arc<dyn OidcService>` for the ID-token-specific calls.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use flow_collab::{OidcService, UserService};
use flow_engine::{AttrValue, Executor, ExecutorError, ExecutorResponse, NodeContext};

use crate::try_service;

use super::core::{filter_claims, filter_userinfo, OAuthCore, ResolvedAuth};

pub const NAME: &str = "OidcExecutor";

pub struct OidcExecutor {
    core: OAuthCore,
    oidc: Arc<dyn OidcService>,
    name: &'static str,
}

impl OidcExecutor {
    /// `service` must implement `OidcService`; the constructor coerces two
    /// independent `Arc` handles to it — one erased to `dyn OAuthService`
    /// for the shared core, one kept as `dyn OidcService` for the ID-token
    /// step — rather than modeling OIDC as a subclass of an OAuth executor.
    pub fn new<S>(service: Arc<S>, users: Arc<dyn UserService>) -> Self
    where
        S: OidcService + 'static,
    {
        let oauth_handle = service.clone();
        Self {
            core: OAuthCore::new(oauth_handle, users),
            oidc: service,
            name: NAME,
        }
    }

    pub fn named<S>(service: Arc<S>, users: Arc<dyn UserService>, name: &'static str) -> Self
    where
        S: OidcService + 'static,
    {
        let mut executor = Self::new(service, users);
        executor.name = name;
        executor
    }

    async fn process(&self, ctx: &NodeContext, idp_id: &str, code: &str) -> Result<ExecutorResponse, ExecutorError> {
        let token = try_service!(self.oidc.exchange_code_for_token(idp_id, code, self.core.use_pkce(ctx)).await);
        let id_token = token.id_token.ok_or_else(|| {
            ExecutorError::InvariantViolation("OIDC code exchange returned no id_token".into())
        })?;
        let claims = try_service!(self.oidc.get_id_token_claims(&id_token).await);

        if let Some(nonce_input) = ctx.user_input("nonce") {
            let claim_nonce = claims.get("nonce").and_then(AttrValue::as_str).unwrap_or("");
            if nonce_input != claim_nonce {
                return Ok(ExecutorResponse::failure(format!(
                    "Nonce mismatch: expected '{claim_nonce}', got '{nonce_input}'"
                )));
            }
        }

        let sub = match claims.get("sub") {
            Some(AttrValue::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                return Ok(ExecutorResponse::failure(
                    "sub claim not found or not a string in ID token",
                ))
            }
        };

        let config = self.core.client_config(idp_id).await?;
        let mut attributes = filter_claims(&claims);
        if config.scopes.iter().any(|s| s != "openid") {
            let userinfo = try_service!(self.oidc.fetch_userinfo(idp_id, &token.access_token).await);
            for (k, v) in filter_userinfo(&userinfo) {
                attributes.insert(k, v);
            }
        }

        self.core.finish(ctx, idp_id, &config, ResolvedAuth { sub, attributes }).await
    }
}

#[async_trait]
impl Executor for OidcExecutor {
    fn name(&self) -> &str {
        self.name
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = self.name))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        let idp_id = self.core.idp_id(ctx)?;
        match ctx.user_input("code").filter(|c| !c.is_empty()) {
            Some(code) => self.process(ctx, idp_id, code).await,
            None => self.core.build_authorize_flow(idp_id).await,
        }
    }
}
