//! User-Type-Resolver executor (§4.10): picks the user type (and its owning
//! organization unit) a registration flow will provision into.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use flow_collab::UserSchemaService;
use flow_engine::{
    Executor, ExecutorError, ExecutorResponse, FlowType, Input, InputType, NodeContext, UserTypeConfig,
};

use crate::try_service;

pub const NAME: &str = "UserTypeResolverExecutor";

pub struct UserTypeResolverExecutor {
    schemas: Arc<dyn UserSchemaService>,
}

impl UserTypeResolverExecutor {
    pub fn new(schemas: Arc<dyn UserSchemaService>) -> Self {
        Self { schemas }
    }

    /// A candidate's schema must both allow self-registration and resolve to
    /// an organization unit, either from the schema itself or the type's own
    /// configured default.
    async fn eligible_ou(
        &self,
        candidate: &UserTypeConfig,
    ) -> Result<Option<String>, ExecutorError> {
        let schema = try_service!(self.schemas.get_user_schema_by_name(&candidate.name).await);
        if !schema.allow_self_registration {
            return Ok(None);
        }
        Ok(schema.organization_unit_id.or_else(|| candidate.default_ou_id.clone()))
    }
}

#[async_trait]
impl Executor for UserTypeResolverExecutor {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        if ctx.application.allowed_user_types.is_empty() {
            return Ok(ExecutorResponse::failure("No user types are allowed for this application"));
        }

        if ctx.flow_type == FlowType::Authentication {
            return Ok(ExecutorResponse::complete());
        }

        if let Some(requested) = ctx.user_input("userType").or_else(|| ctx.runtime("userType")) {
            let Some(candidate) = ctx
                .application
                .allowed_user_types
                .iter()
                .find(|t| t.name == requested)
            else {
                return Ok(ExecutorResponse::failure("Requested user type is not allowed"));
            };
            return match self.eligible_ou(candidate).await? {
                Some(ou_id) => Ok(ExecutorResponse::complete()
                    .with_runtime_data("userType", candidate.name.clone())
                    .with_runtime_data("defaultOUID", ou_id)),
                None => Ok(ExecutorResponse::failure(
                    "Requested user type does not allow self-registration",
                )),
            };
        }

        let mut candidates = Vec::new();
        for user_type in &ctx.application.allowed_user_types {
            if let Some(ou_id) = self.eligible_ou(user_type).await? {
                candidates.push((user_type.name.clone(), ou_id));
            }
        }

        match candidates.len() {
            0 => Ok(ExecutorResponse::failure(
                "No self-registration-enabled user type has a configured organization unit",
            )),
            1 => {
                let (user_type, ou_id) = candidates.into_iter().next().unwrap();
                Ok(ExecutorResponse::complete()
                    .with_runtime_data("userType", user_type)
                    .with_runtime_data("defaultOUID", ou_id))
            }
            _ => {
                let options = candidates.into_iter().map(|(name, _)| name).collect();
                Ok(ExecutorResponse::user_input_required(vec![
                    Input::new("userType", InputType::Dropdown, true).with_options(options),
                ]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_collab::testkit::FakeUserSchemaService;
    use flow_collab::UserSchema;
    use flow_engine::{ApplicationView, AuthenticatedUser, ExecutorStatus};
    use std::collections::HashMap;

    fn ctx(
        flow_type: FlowType,
        allowed: Vec<UserTypeConfig>,
        user_inputs: HashMap<String, String>,
    ) -> NodeContext {
        NodeContext {
            flow_id: "flow-1".into(),
            flow_type,
            app_id: "app-1".into(),
            application: ApplicationView {
                app_id: "app-1".into(),
                allowed_user_types: allowed,
                token: None,
            },
            current_node_id: "node-1".into(),
            node_properties: HashMap::new(),
            node_inputs: Vec::new(),
            user_inputs,
            runtime_data: HashMap::new(),
            authenticated_user: AuthenticatedUser::default(),
            execution_history: HashMap::new(),
            http_context: None,
            executor_mode: None,
        }
    }

    fn type_config(name: &str, self_reg: bool) -> UserTypeConfig {
        UserTypeConfig {
            name: name.to_string(),
            allow_self_registration: self_reg,
            default_ou_id: None,
        }
    }

    #[tokio::test]
    async fn authentication_with_no_allowed_types_fails() {
        let executor = UserTypeResolverExecutor::new(Arc::new(FakeUserSchemaService::new()));
        let resp = executor
            .execute(&ctx(FlowType::Authentication, Vec::new(), HashMap::new()))
            .await
            .unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Failure));
    }

    #[tokio::test]
    async fn authentication_with_allowed_types_completes() {
        let executor = UserTypeResolverExecutor::new(Arc::new(FakeUserSchemaService::new()));
        let resp = executor
            .execute(&ctx(
                FlowType::Authentication,
                vec![type_config("CUSTOMER", true)],
                HashMap::new(),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Complete));
    }

    #[tokio::test]
    async fn single_eligible_candidate_auto_selects() {
        let schemas = FakeUserSchemaService::new().with_schema(
            "CUSTOMER",
            UserSchema {
                organization_unit_id: Some("ou-1".to_string()),
                allow_self_registration: true,
            },
        );
        let executor = UserTypeResolverExecutor::new(Arc::new(schemas));
        let resp = executor
            .execute(&ctx(
                FlowType::Registration,
                vec![type_config("CUSTOMER", true)],
                HashMap::new(),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Complete));
        assert_eq!(resp.runtime_data.get("userType").unwrap(), "CUSTOMER");
        assert_eq!(resp.runtime_data.get("defaultOUID").unwrap(), "ou-1");
    }

    #[tokio::test]
    async fn multiple_eligible_candidates_prompt_dropdown() {
        let schemas = FakeUserSchemaService::new()
            .with_schema(
                "CUSTOMER",
                UserSchema { organization_unit_id: Some("ou-1".to_string()), allow_self_registration: true },
            )
            .with_schema(
                "PARTNER",
                UserSchema { organization_unit_id: Some("ou-2".to_string()), allow_self_registration: true },
            );
        let executor = UserTypeResolverExecutor::new(Arc::new(schemas));
        let resp = executor
            .execute(&ctx(
                FlowType::Registration,
                vec![type_config("CUSTOMER", true), type_config("PARTNER", true)],
                HashMap::new(),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::UserInputRequired));
        assert_eq!(resp.inputs[0].options.len(), 2);
    }

    #[tokio::test]
    async fn requested_type_without_self_registration_fails() {
        let schemas = FakeUserSchemaService::new().with_schema(
            "INTERNAL",
            UserSchema { organization_unit_id: Some("ou-1".to_string()), allow_self_registration: false },
        );
        let executor = UserTypeResolverExecutor::new(Arc::new(schemas));
        let mut inputs = HashMap::new();
        inputs.insert("userType".to_string(), "INTERNAL".to_string());
        let resp = executor
            .execute(&ctx(
                FlowType::Registration,
                vec![type_config("INTERNAL", false)],
                inputs,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Failure));
    }

    #[tokio::test]
    async fn requested_type_not_in_allowed_list_fails() {
        let executor = UserTypeResolverExecutor::new(Arc::new(FakeUserSchemaService::new()));
        let mut inputs = HashMap::new();
        inputs.insert("userType".to_string(), "GHOST".to_string());
        let resp = executor
            .execute(&ctx(
                FlowType::Registration,
                vec![type_config("CUSTOMER", true)],
                inputs,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Failure));
    }
}
