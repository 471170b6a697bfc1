//! Authorization and Permission-Validator executors (§4.7).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use flow_collab::AuthorizationService;
use flow_engine::{Executor, ExecutorError, ExecutorResponse, NodeContext};

use crate::try_service;

/// Resolve the caller's group membership the same way `AuthorizationExecutor`
/// does: the `groups` attribute on the authenticated user (a lone string or a
/// sequence of strings), falling back to a `groups` entry in `RuntimeData`
/// that may itself be a JSON-encoded array.
fn resolve_groups(ctx: &NodeContext) -> Vec<String> {
    if let Some(value) = ctx.authenticated_user.attributes.get("groups") {
        if let Some(groups) = value.as_str_seq() {
            if !groups.is_empty() {
                return groups;
            }
        }
    }
    if let Some(raw) = ctx.runtime_data.get("groups") {
        if let Ok(parsed) = serde_json::from_str::<Vec<String>>(raw) {
            return parsed;
        }
        if !raw.is_empty() {
            return vec![raw.clone()];
        }
    }
    Vec::new()
}

pub const AUTHORIZATION_NAME: &str = "AuthorizationExecutor";

pub struct AuthorizationExecutor {
    authorization: Arc<dyn AuthorizationService>,
}

impl AuthorizationExecutor {
    pub fn new(authorization: Arc<dyn AuthorizationService>) -> Self {
        Self { authorization }
    }
}

#[async_trait]
impl Executor for AuthorizationExecutor {
    fn name(&self) -> &str {
        AUTHORIZATION_NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = AUTHORIZATION_NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        if !ctx.authenticated_user.is_authenticated {
            return Ok(ExecutorResponse::failure("user is not authenticated"));
        }

        let user_id = ctx.authenticated_user.user_id.clone().unwrap_or_default();
        let group_ids = resolve_groups(ctx);
        let requested: Vec<String> = ctx
            .runtime_data
            .get("requested_permissions")
            .or_else(|| ctx.user_inputs.get("requested_permissions"))
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let granted = try_service!(
            self.authorization
                .get_authorized_permissions(&user_id, &group_ids, &requested)
                .await,
            |_desc| "Authorization validation failure".to_string()
        );

        Ok(ExecutorResponse::complete()
            .with_runtime_data("authorized_permissions", granted.join(" ")))
    }
}

pub const PERMISSION_VALIDATOR_NAME: &str = "PermissionValidatorExecutor";

pub struct PermissionValidatorExecutor;

impl PermissionValidatorExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PermissionValidatorExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Executor for PermissionValidatorExecutor {
    fn name(&self) -> &str {
        PERMISSION_VALIDATOR_NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = PERMISSION_VALIDATOR_NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        let required: Vec<String> = ctx
            .property("requiredScopes")
            .and_then(|v| v.as_str_seq())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| vec!["system".to_string()]);

        let http_ctx = match &ctx.http_context {
            Some(http_ctx) => http_ctx,
            None => return Ok(ExecutorResponse::failure("Insufficient permissions")),
        };

        let caller_scopes: Vec<String> = http_ctx
            .attribute("scope")
            .and_then(|v| v.as_str())
            .map(|s| s.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|v| !v.is_empty())
            .or_else(|| http_ctx.attribute("scopes").and_then(|v| v.as_str_seq()).filter(|v| !v.is_empty()))
            .or_else(|| {
                http_ctx
                    .attribute("authorized_permissions")
                    .and_then(|v| v.as_str())
                    .map(|s| s.split_whitespace().map(str::to_string).collect::<Vec<_>>())
                    .filter(|v| !v.is_empty())
            })
            .unwrap_or_default();

        if required.iter().any(|scope| caller_scopes.contains(scope)) {
            Ok(ExecutorResponse::complete())
        } else {
            Ok(ExecutorResponse::failure("Insufficient permissions"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_engine::{ApplicationView, AttrValue, AuthenticatedUser, ExecutorStatus, FlowType, HttpContext};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeAuthorization {
        grant: Vec<String>,
        fail: Option<flow_collab::ServiceError>,
        calls: Mutex<Vec<(String, Vec<String>, Vec<String>)>>,
    }

    #[async_trait]
    impl AuthorizationService for FakeAuthorization {
        async fn get_authorized_permissions(
            &self,
            user_id: &str,
            group_ids: &[String],
            requested_permissions: &[String],
        ) -> Result<Vec<String>, flow_collab::ServiceError> {
            self.calls.lock().unwrap().push((
                user_id.to_string(),
                group_ids.to_vec(),
                requested_permissions.to_vec(),
            ));
            if let Some(err) = &self.fail {
                return Err(err.clone());
            }
            Ok(self.grant.clone())
        }
    }

    fn ctx() -> NodeContext {
        NodeContext {
            flow_id: "flow-1".into(),
            flow_type: FlowType::Authentication,
            app_id: "app-1".into(),
            application: ApplicationView::default(),
            current_node_id: "node-1".into(),
            node_properties: HashMap::new(),
            node_inputs: Vec::new(),
            user_inputs: HashMap::new(),
            runtime_data: HashMap::new(),
            authenticated_user: AuthenticatedUser::authenticated("u1"),
            execution_history: HashMap::new(),
            http_context: None,
            executor_mode: None,
        }
    }

    #[tokio::test]
    async fn grants_requested_permissions() {
        let svc = Arc::new(FakeAuthorization {
            grant: vec!["read".to_string()],
            fail: None,
            calls: Mutex::new(Vec::new()),
        });
        let executor = AuthorizationExecutor::new(svc.clone());

        let mut node_ctx = ctx();
        node_ctx
            .runtime_data
            .insert("requested_permissions".to_string(), "read write".to_string());
        node_ctx
            .authenticated_user
            .attributes
            .insert("groups".to_string(), AttrValue::from("admins"));

        let resp = executor.execute(&node_ctx).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Complete));
        assert_eq!(resp.runtime_data.get("authorized_permissions").unwrap(), "read");
        let calls = svc.calls.lock().unwrap();
        assert_eq!(calls[0].1, vec!["admins".to_string()]);
        assert_eq!(calls[0].2, vec!["read".to_string(), "write".to_string()]);
    }

    #[tokio::test]
    async fn service_failure_becomes_fixed_message() {
        let svc = Arc::new(FakeAuthorization {
            grant: vec![],
            fail: Some(flow_collab::ServiceError::client("denied", "policy store unreachable")),
            calls: Mutex::new(Vec::new()),
        });
        let executor = AuthorizationExecutor::new(svc);
        let resp = executor.execute(&ctx()).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Failure));
        assert_eq!(resp.failure_reason.unwrap(), "Authorization validation failure");
    }

    #[tokio::test]
    async fn unauthenticated_fails() {
        let svc = Arc::new(FakeAuthorization { grant: vec![], fail: None, calls: Mutex::new(Vec::new()) });
        let executor = AuthorizationExecutor::new(svc);
        let mut node_ctx = ctx();
        node_ctx.authenticated_user = AuthenticatedUser::unauthenticated();
        let resp = executor.execute(&node_ctx).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Failure));
    }

    #[tokio::test]
    async fn permission_validator_passes_with_matching_scope() {
        let executor = PermissionValidatorExecutor::new();
        let mut node_ctx = ctx();
        node_ctx.node_properties.insert(
            "requiredScopes".to_string(),
            AttrValue::Array(vec![AttrValue::from("admin"), AttrValue::from("system")]),
        );
        node_ctx.http_context = Some(HttpContext {
            attributes: [("scope".to_string(), AttrValue::from("system readonly"))].into_iter().collect(),
        });
        let resp = executor.execute(&node_ctx).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Complete));
    }

    #[tokio::test]
    async fn permission_validator_defaults_to_system_scope() {
        let executor = PermissionValidatorExecutor::new();
        let mut node_ctx = ctx();
        node_ctx.http_context = Some(HttpContext {
            attributes: [("authorized_permissions".to_string(), AttrValue::from("billing system"))]
                .into_iter()
                .collect(),
        });
        let resp = executor.execute(&node_ctx).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Complete));
    }

    #[tokio::test]
    async fn permission_validator_fails_without_http_context() {
        let executor = PermissionValidatorExecutor::new();
        let resp = executor.execute(&ctx()).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Failure));
        assert_eq!(resp.failure_reason.unwrap(), "Insufficient permissions");
    }
}
