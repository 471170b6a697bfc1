//! Auth-Assertion executor (§4.9): the terminal executor of an
//! authentication flow. Assembles claims from the flow's accumulated state
//! and signs them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use flow_collab::{AssertionGenerator, AssuranceReference, JwtService, OuService, UserRecord, UserService};
use flow_engine::{
    AttrMap, AttrValue, Executor, ExecutorError, ExecutorResponse, ExecutorType, HistoryStatus,
    JwtPolicy, NodeContext,
};

use crate::try_service;
use crate::util::value_to_attr;

pub const NAME: &str = "AuthAssertionExecutor";

/// Map an executor's registry name to the authenticator identifier the
/// assurance claim references. SMS-OTP's `send` and `verify` steps share one
/// executor name and so naturally collapse to one identifier here.
fn canonical_authenticator(executor_name: &str) -> Option<&'static str> {
    match executor_name {
        "BasicAuthExecutor" => Some("credentials"),
        "SmsOtpExecutor" => Some("sms-otp"),
        "OAuthExecutor" => Some("oauth"),
        "OidcExecutor" => Some("oidc"),
        "GitHubExecutor" => Some("github"),
        "GoogleExecutor" => Some("google"),
        _ => None,
    }
}

/// Scan execution history for completed authentication steps, collapse
/// duplicates (one authenticator might appear at more than one step, e.g.
/// SMS-OTP's `send`/`verify` pair), sort by first occurrence, and renumber
/// sequentially.
fn build_assurance_references(
    history: &HashMap<String, flow_engine::ExecutionHistoryEntry>,
) -> Vec<AssuranceReference> {
    let mut earliest_step: HashMap<&'static str, u32> = HashMap::new();
    for entry in history.values() {
        if entry.executor_type != ExecutorType::Authentication || entry.status != HistoryStatus::Complete {
            continue;
        }
        let Some(authenticator) = canonical_authenticator(&entry.executor_name) else {
            continue;
        };
        earliest_step
            .entry(authenticator)
            .and_modify(|step| *step = (*step).min(entry.step))
            .or_insert(entry.step);
    }

    let mut ordered: Vec<(&'static str, u32)> = earliest_step.into_iter().collect();
    ordered.sort_by_key(|(_, step)| *step);

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, (authenticator, _))| AssuranceReference {
            authenticator: authenticator.to_string(),
            step: (i + 1) as u32,
        })
        .collect()
}

pub struct AuthAssertionExecutor {
    users: Arc<dyn UserService>,
    ou: Arc<dyn OuService>,
    jwt: Arc<dyn JwtService>,
    assertion: Arc<dyn AssertionGenerator>,
    policy: JwtPolicy,
}

impl AuthAssertionExecutor {
    pub fn new(
        users: Arc<dyn UserService>,
        ou: Arc<dyn OuService>,
        jwt: Arc<dyn JwtService>,
        assertion: Arc<dyn AssertionGenerator>,
        policy: JwtPolicy,
    ) -> Self {
        Self {
            users,
            ou,
            jwt,
            assertion,
            policy,
        }
    }
}

#[async_trait]
impl Executor for AuthAssertionExecutor {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        if !ctx.authenticated_user.is_authenticated {
            return Ok(ExecutorResponse::failure("user is not authenticated"));
        }
        let user_id = ctx.authenticated_user.user_id.clone().unwrap_or_default();

        let (issuer, validity_seconds) = match &ctx.application.token {
            Some(token) => (
                token.issuer.clone().unwrap_or_else(|| self.policy.default_issuer.clone()),
                token
                    .validity_seconds
                    .unwrap_or(self.policy.default_validity_seconds),
            ),
            None => (
                self.policy.default_issuer.clone(),
                self.policy.default_validity_seconds,
            ),
        };

        let references = build_assurance_references(&ctx.execution_history);
        let assurance = try_service!(self.assertion.generate_assertion(&references).await);

        let mut claims: AttrMap = AttrMap::new();
        claims.insert("assurance".to_string(), value_to_attr(assurance));

        if let Some(authorized) = ctx.runtime_data.get("authorized_permissions") {
            if !authorized.is_empty() {
                claims.insert("authorized_permissions".to_string(), AttrValue::from(authorized.as_str()));
            }
        }

        let mut fetched_user: Option<UserRecord> = None;
        if let Some(token) = &ctx.application.token {
            for attr_name in &token.user_attributes {
                if let Some(value) = ctx.authenticated_user.attributes.get(attr_name) {
                    claims.insert(attr_name.clone(), value.clone());
                    continue;
                }
                if fetched_user.is_none() {
                    fetched_user = try_service!(self.users.get_user(&user_id).await);
                }
                if let Some(record) = &fetched_user {
                    if let Some(value) = record.attributes.get(attr_name) {
                        claims.insert(attr_name.clone(), value.clone());
                    }
                }
            }
        }

        if let Some(user_type) = &ctx.authenticated_user.user_type {
            claims.insert("userType".to_string(), AttrValue::from(user_type.as_str()));
        }
        if let Some(ou_id) = &ctx.authenticated_user.organization_unit_id {
            claims.insert("ouId".to_string(), AttrValue::from(ou_id.as_str()));
            let ou = try_service!(self.ou.get_organization_unit(ou_id).await);
            claims.insert("ouName".to_string(), AttrValue::from(ou.name.as_str()));
            claims.insert("ouHandle".to_string(), AttrValue::from(ou.handle.as_str()));
        }

        let signed = self
            .jwt
            .generate_jwt(&user_id, &ctx.app_id, &issuer, validity_seconds, claims)
            .await
            .map_err(ExecutorError::from)?;

        Ok(ExecutorResponse::complete().with_assertion(signed))
    }
}
