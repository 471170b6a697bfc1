//! The per-invocation input to an executor: [`NodeContext`] and the types it
//! is built from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value::{AttrMap, AttrValue};

/// Whether a flow is establishing a new identity or authenticating an
/// existing one. Several executors branch on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlowType {
    Authentication,
    Registration,
}

/// The datum-shape an executor asks the caller to collect before
/// re-invoking the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    String,
    Text,
    PasswordInput,
    PhoneInput,
    OtpInput,
    Hidden,
    Dropdown,
}

/// Declaration of one datum an executor needs, either as a prerequisite or
/// as node-local user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// Key under which the submitted value lives in `NodeContext::user_inputs`.
    pub identifier: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Stable UI reference; not interpreted by this core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Input {
    pub fn new(identifier: impl Into<String>, input_type: InputType, required: bool) -> Self {
        Self {
            identifier: identifier.into(),
            input_type,
            required,
            options: Vec::new(),
            reference: None,
        }
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// The cumulative authenticated-identity state carried through a flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub is_authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_unit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default)]
    pub attributes: AttrMap,
}

impl AuthenticatedUser {
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn with_organization_unit_id(mut self, ou_id: impl Into<String>) -> Self {
        self.organization_unit_id = Some(ou_id.into());
        self
    }

    pub fn with_user_type(mut self, user_type: impl Into<String>) -> Self {
        self.user_type = Some(user_type.into());
        self
    }

    pub fn with_attributes(mut self, attributes: AttrMap) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Category of executor, used by the Auth-Assertion executor to pick the
/// executions that contribute to the assurance claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutorType {
    Authentication,
    Registration,
    Utility,
}

/// Terminal status of one executor invocation, as recorded in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryStatus {
    Complete,
    UserInputRequired,
    ExternalRedirection,
    Failure,
}

/// One append-only record of a past node execution, as maintained by the
/// outer scheduler. Executors treat this read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionHistoryEntry {
    pub node_id: String,
    pub executor_name: String,
    pub executor_type: ExecutorType,
    pub status: HistoryStatus,
    pub step: u32,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub ended_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor_mode: Option<String>,
}

/// Immutable view of the application a flow is running under.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationView {
    pub app_id: String,
    pub allowed_user_types: Vec<UserTypeConfig>,
    #[serde(default)]
    pub token: Option<TokenPolicy>,
}

/// A user type an application allows, and whether it supports self-registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTypeConfig {
    pub name: String,
    pub allow_self_registration: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ou_id: Option<String>,
}

/// Token-issuance policy configured on the application, consumed by
/// Auth-Assertion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_seconds: Option<i64>,
    #[serde(default)]
    pub user_attributes: Vec<String>,
}

/// Opaque handle carrying the caller's security attributes (bearer token
/// scopes, mTLS identity, …). This core never parses the transport; it only
/// reads attributes the outer HTTP layer already extracted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpContext {
    pub attributes: AttrMap,
}

impl HttpContext {
    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }
}

/// Per-invocation input to an executor.
///
/// Created by the outer scheduler for exactly one node step and discarded
/// once the executor returns; `runtime_data` is the only channel that
/// survives between invocations (via `ExecutorResponse::runtime_data`).
#[derive(Debug, Clone)]
pub struct NodeContext {
    pub flow_id: String,
    pub flow_type: FlowType,
    pub app_id: String,
    pub application: ApplicationView,
    pub current_node_id: String,
    pub node_properties: HashMap<String, AttrValue>,
    pub node_inputs: Vec<Input>,
    pub user_inputs: HashMap<String, String>,
    pub runtime_data: HashMap<String, String>,
    pub authenticated_user: AuthenticatedUser,
    pub execution_history: HashMap<String, ExecutionHistoryEntry>,
    pub http_context: Option<HttpContext>,
    pub executor_mode: Option<String>,
}

impl NodeContext {
    /// `runtime_data` lookup helper used by most executors.
    pub fn runtime(&self, key: &str) -> Option<&str> {
        self.runtime_data.get(key).map(String::as_str)
    }

    /// `user_inputs` lookup helper.
    pub fn user_input(&self, key: &str) -> Option<&str> {
        self.user_inputs.get(key).map(String::as_str)
    }

    /// First non-empty value among `runtime_data`, `user_inputs`, then an
    /// attribute on `authenticated_user` — the resolution order SMS-OTP (and
    /// several other executors) use to find a datum that might have been
    /// supplied at any earlier point in the flow.
    pub fn resolve(&self, key: &str) -> Option<String> {
        if let Some(v) = self.runtime_data.get(key) {
            if !v.is_empty() {
                return Some(v.clone());
            }
        }
        if let Some(v) = self.user_inputs.get(key) {
            if !v.is_empty() {
                return Some(v.clone());
            }
        }
        if let Some(v) = self.authenticated_user.attributes.get(key) {
            if !v.is_empty_ish() {
                return Some(v.to_display_string());
            }
        }
        None
    }

    /// Node property lookup with a default-value fallback.
    pub fn property(&self, key: &str) -> Option<&AttrValue> {
        self.node_properties.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_ctx() -> NodeContext {
        NodeContext {
            flow_id: "f1".into(),
            flow_type: FlowType::Authentication,
            app_id: "app1".into(),
            application: ApplicationView::default(),
            current_node_id: "n1".into(),
            node_properties: HashMap::new(),
            node_inputs: Vec::new(),
            user_inputs: HashMap::new(),
            runtime_data: HashMap::new(),
            authenticated_user: AuthenticatedUser::default(),
            execution_history: HashMap::new(),
            http_context: None,
            executor_mode: None,
        }
    }

    #[test]
    fn resolve_prefers_runtime_data() {
        let mut ctx = empty_ctx();
        ctx.runtime_data.insert("mobile_number".into(), "+1000".into());
        ctx.user_inputs.insert("mobile_number".into(), "+2000".into());
        assert_eq!(ctx.resolve("mobile_number"), Some("+1000".to_string()));
    }

    #[test]
    fn resolve_falls_back_to_user_inputs_then_attributes() {
        let mut ctx = empty_ctx();
        ctx.user_inputs.insert("mobile_number".into(), "+2000".into());
        assert_eq!(ctx.resolve("mobile_number"), Some("+2000".to_string()));

        let mut ctx2 = empty_ctx();
        ctx2.authenticated_user.attributes.insert(
            "mobile_number".into(),
            AttrValue::from("+3000"),
        );
        assert_eq!(ctx2.resolve("mobile_number"), Some("+3000".to_string()));
    }

    #[test]
    fn resolve_skips_empty_values() {
        let mut ctx = empty_ctx();
        ctx.runtime_data.insert("mobile_number".into(), "".into());
        ctx.user_inputs.insert("mobile_number".into(), "+2000".into());
        assert_eq!(ctx.resolve("mobile_number"), Some("+2000".to_string()));
    }
}
