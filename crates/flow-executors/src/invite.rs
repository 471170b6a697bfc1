//! Invite executor (§4.10): a two-phase token challenge, idempotent across
//! admin retries of the first phase.

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use flow_engine::{Executor, ExecutorError, ExecutorResponse, Input, InputType, InvitePolicy, NodeContext};

pub const NAME: &str = "InviteExecutor";

pub struct InviteExecutor {
    policy: InvitePolicy,
}

impl InviteExecutor {
    pub fn new(policy: InvitePolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Executor for InviteExecutor {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        if let Some(submitted) = ctx.user_input("inviteToken") {
            let stored = ctx.runtime("storedInviteToken").unwrap_or("");
            if stored.is_empty() {
                return Err(ExecutorError::InvariantViolation(
                    "Invite verification invoked with no storedInviteToken in RuntimeData".into(),
                ));
            }
            return if submitted == stored {
                Ok(ExecutorResponse::complete())
            } else {
                Ok(ExecutorResponse::failure("Invalid invite token"))
            };
        }

        let token = ctx
            .runtime("storedInviteToken")
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let link = format!(
            "{}/invite?flowId={}&inviteToken={}",
            self.policy.gate_base_url.trim_end_matches('/'),
            ctx.flow_id,
            token
        );

        let mut resp =
            ExecutorResponse::user_input_required(vec![Input::new("inviteToken", InputType::String, true)]);
        resp.runtime_data.insert("storedInviteToken".to_string(), token);
        resp.additional_data.insert("inviteLink".to_string(), link);
        Ok(resp)
    }
}
