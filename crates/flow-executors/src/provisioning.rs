//! Provisioning executor (§4.10): creates the user record a registration
//! flow has been assembling attributes for.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use flow_collab::UserService;
use flow_engine::{
    AttrMap, AuthenticatedUser, Executor, ExecutorError, ExecutorResponse, NodeContext,
};

use crate::try_service;
use crate::util::string_map_to_attrmap;

pub const NAME: &str = "ProvisioningExecutor";

const RESERVED_INPUT_KEYS: &[&str] = &["userType", "defaultOUID", "skipProvisioning", "userID"];

pub struct ProvisioningExecutor {
    users: Arc<dyn UserService>,
}

impl ProvisioningExecutor {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Executor for ProvisioningExecutor {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        if ctx.runtime("skipProvisioning") == Some("true") {
            return Ok(ExecutorResponse::complete());
        }

        let user_type = ctx.runtime("userType").unwrap_or_default();
        let ou_id = ctx.runtime("defaultOUID").unwrap_or_default();
        if user_type.is_empty() || ou_id.is_empty() {
            return Err(ExecutorError::InvariantViolation(
                "Provisioning invoked with no userType/defaultOUID in RuntimeData".into(),
            ));
        }

        let mut attributes: AttrMap = ctx.authenticated_user.attributes.clone();
        let extra: std::collections::HashMap<String, String> = ctx
            .user_inputs
            .iter()
            .filter(|(k, _)| !RESERVED_INPUT_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        attributes.extend(string_map_to_attrmap(&extra));

        let created = try_service!(self.users.create_user(user_type, ou_id, attributes).await);

        Ok(ExecutorResponse::complete()
            .with_authenticated_user(
                AuthenticatedUser::authenticated(created.id.clone())
                    .with_organization_unit_id(created.organization_unit_id)
                    .with_user_type(created.user_type)
                    .with_attributes(created.attributes),
            )
            .with_runtime_data("userID", created.id))
    }
}
