//! Attribute-Collector executor (§4.6): merges attributes from the
//! authenticated user, the user store, and the caller's own submission.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use flow_collab::UserService;
use flow_engine::{
    BaseExecutor, Executor, ExecutorError, ExecutorResponse, FlowType, Input, InputType,
    NodeContext,
};

use crate::try_service;
use crate::util::string_map_to_attrmap;

pub const NAME: &str = "AttributeCollectorExecutor";

pub struct AttributeCollectorExecutor {
    base: BaseExecutor,
    users: Arc<dyn UserService>,
}

impl AttributeCollectorExecutor {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self {
            base: BaseExecutor::new(vec![], vec![Input::new("userID", InputType::String, true)]),
            users,
        }
    }
}

#[async_trait]
impl Executor for AttributeCollectorExecutor {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        if ctx.flow_type == FlowType::Registration {
            return Ok(ExecutorResponse::complete());
        }
        if !ctx.authenticated_user.is_authenticated {
            return Ok(ExecutorResponse::failure("user is not authenticated"));
        }

        let mut prereq_resp = ExecutorResponse::new();
        if !self.base.validate_prerequisites(ctx, &mut prereq_resp) {
            return Ok(ExecutorResponse::user_input_required(prereq_resp.inputs));
        }

        let mut collected: HashMap<String, String> = HashMap::new();
        let mut missing: Vec<Input> = Vec::new();

        for input in self.base.required_inputs(ctx) {
            if !input.required {
                continue;
            }
            let already_present = ctx
                .user_inputs
                .get(&input.identifier)
                .map(|v| !v.is_empty())
                .unwrap_or(false)
                || ctx
                    .runtime_data
                    .get(&input.identifier)
                    .map(|v| !v.is_empty())
                    .unwrap_or(false);
            if already_present {
                continue;
            }

            if input.identifier != "password" {
                if let Some(value) = ctx.authenticated_user.attributes.get(&input.identifier) {
                    if !value.is_empty_ish() {
                        collected.insert(input.identifier.clone(), value.to_display_string());
                        continue;
                    }
                }
            }
            missing.push(input.clone());
        }

        if !missing.is_empty() {
            let user_id = BaseExecutor::user_id_from_context(ctx);
            let record = try_service!(self.users.get_user(user_id).await);
            if let Some(record) = record {
                missing.retain(|input| {
                    if input.identifier == "password" {
                        return true;
                    }
                    match record.attributes.get(&input.identifier) {
                        Some(value) if !value.is_empty_ish() => {
                            collected.insert(input.identifier.clone(), value.to_display_string());
                            false
                        }
                        _ => true,
                    }
                });
            }
        }

        if !missing.is_empty() {
            let mut resp = ExecutorResponse::user_input_required(missing);
            resp.runtime_data = collected;
            return Ok(resp);
        }

        let mut new_values: HashMap<String, String> = ctx.runtime_data.clone();
        new_values.extend(collected.clone());
        new_values.extend(ctx.user_inputs.clone());
        new_values.remove("userID");

        let user_id = BaseExecutor::user_id_from_context(ctx);
        let existing = try_service!(self.users.get_user(user_id).await).ok_or_else(|| {
            ExecutorError::InvariantViolation(format!("userID {user_id} not found in user store"))
        })?;

        let mut combined = existing.attributes.clone();
        let mut changed = false;
        for (k, v) in string_map_to_attrmap(&new_values) {
            if combined.get(&k) != Some(&v) {
                changed = true;
            }
            combined.insert(k, v);
        }

        if changed {
            try_service!(self.users.update_user(user_id, combined).await);
        }

        let mut resp = ExecutorResponse::complete();
        resp.runtime_data = collected;
        Ok(resp)
    }
}
