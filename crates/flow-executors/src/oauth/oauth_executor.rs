//! `OAuthExecutor` — plain-OAuth member of the family (no ID token). Subject
//! and attributes come from the userinfo endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use flow_collab::{OAuthService, UserService};
use flow_engine::{AttrValue, Executor, ExecutorError, ExecutorResponse, NodeContext};

use crate::try_service;

use super::core::{filter_userinfo, OAuthCore, ResolvedAuth};

pub const NAME: &str = "OAuthExecutor";

pub struct OAuthExecutor {
    core: OAuthCore,
    name: &'static str,
}

impl OAuthExecutor {
    pub fn new(oauth: Arc<dyn OAuthService>, users: Arc<dyn UserService>) -> Self {
        Self {
            core: OAuthCore::new(oauth, users),
            name: NAME,
        }
    }

    /// Build with a fixed registry name — used by the GitHub shim.
    pub fn named(oauth: Arc<dyn OAuthService>, users: Arc<dyn UserService>, name: &'static str) -> Self {
        Self {
            core: OAuthCore::new(oauth, users),
            name,
        }
    }

    async fn process(&self, ctx: &NodeContext, idp_id: &str, code: &str) -> Result<ExecutorResponse, ExecutorError> {
        let token = try_service!(
            self.core
                .oauth
                .exchange_code_for_token(idp_id, code, self.core.use_pkce(ctx))
                .await
        );
        let userinfo = try_service!(self.core.oauth.fetch_userinfo(idp_id, &token.access_token).await);

        let sub = match userinfo.get("sub").or_else(|| userinfo.get("id")) {
            Some(AttrValue::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                return Ok(ExecutorResponse::failure(
                    "sub claim not found or not a string in authentication response",
                ))
            }
        };

        let config = self.core.client_config(idp_id).await?;
        let attributes = filter_userinfo(&userinfo);
        self.core.finish(ctx, idp_id, &config, ResolvedAuth { sub, attributes }).await
    }
}

#[async_trait]
impl Executor for OAuthExecutor {
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
