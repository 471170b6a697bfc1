//! Credential-Setter executor (§4.10): persists one flow-author-declared
//! input as a credential via the user service's credential-update endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use flow_collab::UserService;
use flow_engine::{BaseExecutor, Executor, ExecutorError, ExecutorResponse, Input, InputType, NodeContext};

use crate::try_service;

pub const NAME: &str = "CredentialSetterExecutor";

pub struct CredentialSetterExecutor {
    base: BaseExecutor,
    users: Arc<dyn UserService>,
}

impl CredentialSetterExecutor {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self {
            base: BaseExecutor::new(
                vec![Input::new("password", InputType::PasswordInput, true)],
                vec![Input::new("userID", InputType::String, true)],
            ),
            users,
        }
    }
}

#[async_trait]
impl Executor for CredentialSetterExecutor {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        let mut prereq_resp = ExecutorResponse::new();
        if !self.base.validate_prerequisites(ctx, &mut prereq_resp) {
            return Ok(ExecutorResponse::user_input_required(prereq_resp.inputs));
        }

        let Some(input) = self.base.required_inputs(ctx).iter().find(|i| i.required) else {
            return Err(ExecutorError::Configuration(
                "Credential-Setter node declares no required input".into(),
            ));
        };

        if input.identifier.is_empty() {
            return Err(ExecutorError::Configuration(
                "Credential-Setter input declares an empty identifier".into(),
            ));
        }

        let value = ctx.user_inputs.get(&input.identifier).cloned().unwrap_or_default();
        if value.is_empty() {
            return Ok(ExecutorResponse::user_input_required(vec![input.clone()]));
        }

        let user_id = BaseExecutor::user_id_from_context(ctx);
        let mut credential = HashMap::new();
        credential.insert(input.identifier.clone(), value);

        try_service!(self.users.update_user_credentials(user_id, credential).await);
        Ok(ExecutorResponse::complete())
    }
}
