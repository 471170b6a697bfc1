//! Basic-Auth executor (§4.3): password authentication, and the
//! pre-registration uniqueness check that shares its input shape.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use flow_collab::{CredentialsAuthService, UserService};
use flow_engine::{
    AuthenticatedUser, BaseExecutor, Executor, ExecutorError, ExecutorResponse, FlowType, Input,
    InputType, NodeContext,
};

use crate::try_service;
use crate::util::string_map_to_attrmap;

pub const NAME: &str = "BasicAuthExecutor";

pub struct BasicAuthExecutor {
    base: BaseExecutor,
    users: Arc<dyn UserService>,
    credentials: Arc<dyn CredentialsAuthService>,
}

impl BasicAuthExecutor {
    pub fn new(users: Arc<dyn UserService>, credentials: Arc<dyn CredentialsAuthService>) -> Self {
        Self {
            base: BaseExecutor::new(
                vec![
                    Input::new("username", InputType::String, true),
                    Input::new("password", InputType::PasswordInput, true),
                ],
                vec![],
            ),
            users,
            credentials,
        }
    }
}

#[async_trait]
impl Executor for BasicAuthExecutor {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        let mut resp = ExecutorResponse::new();
        if !self.base.has_required_inputs(ctx, &mut resp) {
            return Ok(ExecutorResponse::user_input_required(resp.inputs));
        }

        let full_attributes = self
            .base
            .required_inputs(ctx)
            .iter()
            .filter_map(|input| {
                ctx.user_inputs
                    .get(&input.identifier)
                    .map(|v| (input.identifier.clone(), v.clone()))
            })
            .collect::<std::collections::HashMap<_, _>>();

        let identifying_attributes = full_attributes
            .iter()
            .filter(|(k, _)| k.as_str() != "password")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<std::collections::HashMap<_, _>>();

        match ctx.flow_type {
            FlowType::Registration => {
                let found = try_service!(self.users.identify_user(&identifying_attributes).await);
                match found {
                    None => Ok(ExecutorResponse::complete().with_authenticated_user(
                        AuthenticatedUser::unauthenticated()
                            .with_attributes(string_map_to_attrmap(&identifying_attributes)),
                    )),
                    Some(_) => Ok(ExecutorResponse::failure(
                        "User already exists with the provided attributes.",
                    )),
                }
            }
            FlowType::Authentication => {
                let user = try_service!(
                    self.credentials.authenticate(&full_attributes).await,
                    |desc| format!("Failed to authenticate user: {desc}")
                );
                Ok(ExecutorResponse::complete().with_authenticated_user(
                    AuthenticatedUser::authenticated(user.id)
                        .with_organization_unit_id(user.organization_unit_id)
                        .with_user_type(user.user_type)
                        .with_attributes(user.attributes),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_collab::testkit::{FakeCredentialsAuthService, FakeUserService};
    use flow_collab::UserRecord;
    use flow_engine::{ApplicationView, ExecutionHistoryEntry, ExecutorStatus, HttpContext};
    use std::collections::HashMap;

    fn ctx(flow_type: FlowType, user_inputs: HashMap<String, String>) -> NodeContext {
        NodeContext {
            flow_id: "flow-1".into(),
            flow_type,
            app_id: "app-1".into(),
            application: ApplicationView::default(),
            current_node_id: "node-1".into(),
            node_properties: HashMap::new(),
            node_inputs: Vec::new(),
            user_inputs,
            runtime_data: HashMap::new(),
            authenticated_user: AuthenticatedUser::default(),
            execution_history: HashMap::<String, ExecutionHistoryEntry>::new(),
            http_context: None::<HttpContext>,
            executor_mode: None,
        }
    }

    #[tokio::test]
    async fn authentication_success_yields_authenticated_user() {
        let user = UserRecord {
            id: "u1".into(),
            organization_unit_id: "ou1".into(),
            user_type: "INTERNAL".into(),
            attributes: [("email".to_string(), flow_engine::AttrValue::from("a@x"))]
                .into_iter()
                .collect(),
        };
        let credentials = Arc::new(FakeCredentialsAuthService::new().with_account("alice", "p", user));
        let users = Arc::new(FakeUserService::new());
        let executor = BasicAuthExecutor::new(users, credentials);

        let mut inputs = HashMap::new();
        inputs.insert("username".to_string(), "alice".to_string());
        inputs.insert("password".to_string(), "p".to_string());
        let node_ctx = ctx(FlowType::Authentication, inputs);

        let resp = executor.execute(&node_ctx).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Complete));
        let user = resp.authenticated_user.unwrap();
        assert!(user.is_authenticated);
        assert_eq!(user.user_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn missing_inputs_requires_input() {
        let executor = BasicAuthExecutor::new(
            Arc::new(FakeUserService::new()),
            Arc::new(FakeCredentialsAuthService::new()),
        );
        let node_ctx = ctx(FlowType::Authentication, HashMap::new());
        let resp = executor.execute(&node_ctx).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::UserInputRequired));
        assert_eq!(resp.inputs.len(), 2);
    }

    #[tokio::test]
    async fn wrong_password_is_client_failure() {
        let user = UserRecord {
            id: "u1".into(),
            organization_unit_id: "ou1".into(),
            user_type: "INTERNAL".into(),
            attributes: Default::default(),
        };
        let credentials = Arc::new(FakeCredentialsAuthService::new().with_account("alice", "p", user));
        let executor = BasicAuthExecutor::new(Arc::new(FakeUserService::new()), credentials);

        let mut inputs = HashMap::new();
        inputs.insert("username".to_string(), "alice".to_string());
        inputs.insert("password".to_string(), "wrong".to_string());
        let node_ctx = ctx(FlowType::Authentication, inputs);

        let resp = executor.execute(&node_ctx).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Failure));
        assert!(resp.failure_reason.unwrap().starts_with("Failed to authenticate user"));
    }

    #[tokio::test]
    async fn registration_not_found_is_complete_with_identifying_attributes() {
        let executor = BasicAuthExecutor::new(
            Arc::new(FakeUserService::new()),
            Arc::new(FakeCredentialsAuthService::new()),
        );
        let mut inputs = HashMap::new();
        inputs.insert("username".to_string(), "newuser".to_string());
        inputs.insert("password".to_string(), "p".to_string());
        let node_ctx = ctx(FlowType::Registration, inputs);

        let resp = executor.execute(&node_ctx).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Complete));
        let user = resp.authenticated_user.unwrap();
        assert!(!user.is_authenticated);
        assert!(user.attributes.contains_key("username"));
        assert!(!user.attributes.contains_key("password"));
    }

    #[tokio::test]
    async fn registration_existing_user_fails() {
        let users = Arc::new(FakeUserService::new());
        users.seed(UserRecord {
            id: "u1".into(),
            organization_unit_id: "ou1".into(),
            user_type: "INTERNAL".into(),
            attributes: [("username".to_string(), flow_engine::AttrValue::from("alice"))]
                .into_iter()
                .collect(),
        });
        let executor = BasicAuthExecutor::new(users, Arc::new(FakeCredentialsAuthService::new()));
        let mut inputs = HashMap::new();
        inputs.insert("username".to_string(), "alice".to_string());
        inputs.insert("password".to_string(), "p".to_string());
        let node_ctx = ctx(FlowType::Registration, inputs);

        let resp = executor.execute(&node_ctx).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Failure));
        assert_eq!(
            resp.failure_reason.as_deref(),
            Some("User already exists with the provided attributes.")
        );
    }
}
