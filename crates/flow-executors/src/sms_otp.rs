//! SMS-OTP executor (§4.4): a two-mode state machine dispatched on
//! `NodeContext::executor_mode` (`send` / `verify`).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::instrument;

use flow_collab::{OtpChannel, OtpService, OtpVerificationStatus, UserService};
use flow_engine::{
    AttrValue, AuthenticatedUser, BaseExecutor, Executor, ExecutorError, ExecutorResponse,
    FlowType, Input, InputType, NodeContext, OtpPolicy,
};

use crate::try_service;

pub const NAME: &str = "SmsOtpExecutor";

const MODE_VERIFY: &str = "verify";

pub struct SmsOtpExecutor {
    base: BaseExecutor,
    users: Arc<dyn UserService>,
    otp: Arc<dyn OtpService>,
    policy: OtpPolicy,
}

impl SmsOtpExecutor {
    pub fn new(users: Arc<dyn UserService>, otp: Arc<dyn OtpService>, policy: OtpPolicy) -> Self {
        Self {
            base: BaseExecutor::new(
                vec![Input::new("otp", InputType::OtpInput, true)],
                vec![Input::new("mobile_number", InputType::PhoneInput, true)],
            ),
            users,
            otp,
            policy,
        }
    }

    fn mobile_prompt() -> ExecutorResponse {
        ExecutorResponse::user_input_required(vec![Input::new(
            "mobile_number",
            InputType::PhoneInput,
            true,
        )])
        .with_meta(json!({
            "prompt": "Enter your mobile number to receive a one-time code.",
        }))
    }

    /// Resolve a user-id (and, transitively, a mobile number) for an
    /// authentication flow that arrived with no mobile number yet known.
    ///
    /// Probes, in order: a user-id already in context, then `identify_user`
    /// against `mobile_number`, `username`, `email` — whichever of those
    /// keys has a value in context. First hit wins.
    async fn satisfy_prerequisites(
        &self,
        ctx: &NodeContext,
    ) -> Result<Option<(String, String)>, ExecutorError> {
        let existing_user_id = BaseExecutor::user_id_from_context(ctx);
        let user_id = if !existing_user_id.is_empty() {
            Some(existing_user_id.to_string())
        } else {
            let mut found = None;
            for key in ["mobile_number", "username", "email"] {
                let Some(value) = ctx.resolve(key) else {
                    continue;
                };
                let mut filters = HashMap::new();
                filters.insert(key.to_string(), value);
                if let Some(user) = try_or_propagate(self.users.identify_user(&filters).await)? {
                    found = Some(user.id);
                    break;
                }
            }
            found
        };

        let Some(user_id) = user_id else {
            return Ok(None);
        };

        let mobile = match ctx.resolve("mobile_number") {
            Some(m) => Some(m),
            None => {
                let record = try_or_propagate(self.users.get_user(&user_id).await)?;
                record
                    .and_then(|r| r.attributes.get("mobile_number").cloned())
                    .and_then(|v| v.as_str().map(str::to_string))
            }
        };

        Ok(mobile.map(|m| (m, user_id)))
    }

    async fn send(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        let mut promoted = HashMap::new();

        let mobile = match ctx.resolve("mobile_number") {
            Some(m) => m,
            None => {
                if ctx.flow_type == FlowType::Registration {
                    return Ok(Self::mobile_prompt());
                }
                match self.satisfy_prerequisites(ctx).await? {
                    None => return Ok(Self::mobile_prompt()),
                    Some((mobile, user_id)) => {
                        promoted.insert("mobile_number".to_string(), mobile.clone());
                        promoted.insert("userID".to_string(), user_id);
                        mobile
                    }
                }
            }
        };

        if ctx.flow_type == FlowType::Registration {
            let mut filters = HashMap::new();
            filters.insert("mobile_number".to_string(), mobile.clone());
            let found = try_service!(self.users.identify_user(&filters).await);
            if found.is_some() {
                return Ok(ExecutorResponse::failure(
                    "User already exists with the provided mobile number.",
                ));
            }
        }

        let attempt_count: u32 = ctx
            .runtime("attemptCount")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        if attempt_count >= self.policy.max_attempts {
            return Ok(ExecutorResponse::failure(format!(
                "maximum OTP attempts reached: {}",
                self.policy.max_attempts
            )));
        }

        let sender_id = match ctx.property("senderId").and_then(AttrValue::as_str) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => return Err(ExecutorError::Configuration("missing senderId".into())),
        };

        let sent = try_service!(self.otp.send_otp(&mobile, &sender_id, OtpChannel::Sms).await);

        let mut resp = ExecutorResponse::complete();
        resp.runtime_data = promoted;
        resp.runtime_data
            .insert("otpSessionToken".to_string(), sent.session_token);
        resp.runtime_data
            .insert("attemptCount".to_string(), (attempt_count + 1).to_string());
        Ok(resp)
    }

    async fn verify(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        let mut resp = ExecutorResponse::new();
        if !self.base.has_required_inputs(ctx, &mut resp) {
            return Ok(ExecutorResponse::user_input_required(resp.inputs));
        }

        let session_token = ctx.runtime("otpSessionToken").unwrap_or("");
        if session_token.is_empty() {
            return Err(ExecutorError::InvariantViolation(
                "SMS-OTP verify invoked with no otpSessionToken in RuntimeData".into(),
            ));
        }
        let otp_code = ctx.user_input("otp").unwrap_or("");

        let verified = try_service!(self.otp.verify_otp(session_token, otp_code).await);
        if verified.status != OtpVerificationStatus::Verified {
            return Ok(ExecutorResponse::failure("invalid OTP provided"));
        }

        let mobile = ctx.resolve("mobile_number").unwrap_or_default();

        let mut out = ExecutorResponse::complete();
        out.runtime_data
            .insert("otpSessionToken".to_string(), String::new());

        let user = if ctx.flow_type == FlowType::Registration {
            AuthenticatedUser::unauthenticated()
                .with_attributes([("mobile_number".to_string(), AttrValue::from(mobile.as_str()))].into())
        } else if ctx.authenticated_user.is_authenticated {
            let mut attrs = ctx.authenticated_user.attributes.clone();
            attrs
                .entry("mobile_number".to_string())
                .or_insert_with(|| AttrValue::from(mobile.as_str()));
            AuthenticatedUser {
                is_authenticated: true,
                attributes: attrs,
                ..ctx.authenticated_user.clone()
            }
        } else {
            let user_id = BaseExecutor::user_id_from_context(ctx);
            let record = try_or_propagate(self.users.get_user(user_id).await)?.ok_or_else(|| {
                ExecutorError::InvariantViolation(format!(
                    "userID {user_id} not found while verifying OTP"
                ))
            })?;
            let mut attrs = record.attributes;
            attrs
                .entry("mobile_number".to_string())
                .or_insert_with(|| AttrValue::from(mobile.as_str()));
            AuthenticatedUser::authenticated(record.id)
                .with_organization_unit_id(record.organization_unit_id)
                .with_user_type(record.user_type)
                .with_attributes(attrs)
        };

        Ok(out.with_authenticated_user(user))
    }
}

fn try_or_propagate<T>(
    result: Result<T, flow_collab::ServiceError>,
) -> Result<T, ExecutorError> {
    result.map_err(ExecutorError::from)
}

#[async_trait]
impl Executor for SmsOtpExecutor {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = NAME, mode = ctx.executor_mode.as_deref().unwrap_or("send")))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        match ctx.executor_mode.as_deref() {
            Some(MODE_VERIFY) => self.verify(ctx).await,
            _ => self.send(ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_collab::testkit::FakeOtpService;
    use flow_collab::testkit::FakeUserService;
    use flow_engine::{ApplicationView, ExecutorStatus};

    fn ctx(
        flow_type: FlowType,
        mode: Option<&str>,
        runtime: HashMap<String, String>,
        user_inputs: HashMap<String, String>,
    ) -> NodeContext {
        NodeContext {
            flow_id: "flow-1".into(),
            flow_type,
            app_id: "app-1".into(),
            application: ApplicationView::default(),
            current_node_id: "node-1".into(),
            node_properties: [("senderId".to_string(), AttrValue::from("S"))].into(),
            node_inputs: Vec::new(),
            user_inputs,
            runtime_data: runtime,
            authenticated_user: AuthenticatedUser::default(),
            execution_history: HashMap::new(),
            http_context: None,
            executor_mode: mode.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn send_then_verify_round_trips() {
        let otp = Arc::new(FakeOtpService::new());
        let users = Arc::new(FakeUserService::new());
        let executor = SmsOtpExecutor::new(users, otp, OtpPolicy::default());

        let mut runtime = HashMap::new();
        runtime.insert("mobile_number".to_string(), "+15555550100".to_string());
        runtime.insert("userID".to_string(), "u1".to_string());
        let send_ctx = ctx(FlowType::Authentication, Some("send"), runtime, HashMap::new());

        let send_resp = executor.execute(&send_ctx).await.unwrap();
        assert_eq!(send_resp.status, Some(ExecutorStatus::Complete));
        assert_eq!(send_resp.runtime_data.get("attemptCount").unwrap(), "1");
        let token = send_resp.runtime_data.get("otpSessionToken").unwrap().clone();

        let mut verify_runtime = send_ctx.runtime_data.clone();
        for (k, v) in &send_resp.runtime_data {
            verify_runtime.insert(k.clone(), v.clone());
        }
        let mut user_inputs = HashMap::new();
        user_inputs.insert("otp".to_string(), "123456".to_string());
        let verify_ctx = ctx(FlowType::Authentication, Some("verify"), verify_runtime, user_inputs);

        let verify_resp = executor.execute(&verify_ctx).await.unwrap();
        assert_eq!(verify_resp.status, Some(ExecutorStatus::Complete));
        assert!(verify_resp.authenticated_user.unwrap().is_authenticated);
        assert_eq!(verify_resp.runtime_data.get("otpSessionToken").unwrap(), "");
        let _ = token;
    }

    #[tokio::test]
    async fn attempt_cap_is_enforced() {
        let otp = Arc::new(FakeOtpService::new());
        let users = Arc::new(FakeUserService::new());
        let executor = SmsOtpExecutor::new(users, otp, OtpPolicy::default());

        let mut runtime = HashMap::new();
        runtime.insert("mobile_number".to_string(), "+15555550100".to_string());
        runtime.insert("userID".to_string(), "u1".to_string());
        runtime.insert("attemptCount".to_string(), "3".to_string());
        let send_ctx = ctx(FlowType::Authentication, Some("send"), runtime, HashMap::new());

        let resp = executor.execute(&send_ctx).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::Failure));
        assert_eq!(
            resp.failure_reason.as_deref(),
            Some("maximum OTP attempts reached: 3")
        );
    }

    #[tokio::test]
    async fn missing_mobile_in_registration_prompts_for_it() {
        let otp = Arc::new(FakeOtpService::new());
        let users = Arc::new(FakeUserService::new());
        let executor = SmsOtpExecutor::new(users, otp, OtpPolicy::default());
        let send_ctx = ctx(FlowType::Registration, Some("send"), HashMap::new(), HashMap::new());

        let resp = executor.execute(&send_ctx).await.unwrap();
        assert_eq!(resp.status, Some(ExecutorStatus::UserInputRequired));
        assert_eq!(resp.inputs[0].identifier, "mobile_number");
    }

    #[tokio::test]
    async fn verify_without_session_token_is_invariant_violation() {
        let otp = Arc::new(FakeOtpService::new());
        let users = Arc::new(FakeUserService::new());
        let executor = SmsOtpExecutor::new(users, otp, OtpPolicy::default());
        let mut user_inputs = HashMap::new();
        user_inputs.insert("otp".to_string(), "123456".to_string());
        let verify_ctx = ctx(FlowType::Authentication, Some("verify"), HashMap::new(), user_inputs);

        let err = executor.execute(&verify_ctx).await.unwrap_err();
        assert!(matches!(err, ExecutorError::InvariantViolation(_)));
    }
}
