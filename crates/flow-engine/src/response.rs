//! The per-invocation output of an executor: [`ExecutorResponse`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::context::{AuthenticatedUser, Input};
use crate::value::AttrValue;

/// Control-flow outcome of one executor invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutorStatus {
    Complete,
    UserInputRequired,
    ExternalRedirection,
    Failure,
}

/// Opaque UI-rendering hint. This core treats it as an inert JSON value; the
/// interpretation belongs to the UI layer.
pub type Meta = serde_json::Value;

/// Output of one executor invocation, merged by the scheduler back into
/// shared flow state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutorResponse {
    pub status: Option<ExecutorStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<Input>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticated_user: Option<AuthenticatedUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<String>,
    #[serde(default)]
    pub runtime_data: HashMap<String, String>,
    #[serde(default)]
    pub additional_data: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl ExecutorResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a `Complete` response, optionally carrying an authenticated user.
    pub fn complete() -> Self {
        Self {
            status: Some(ExecutorStatus::Complete),
            ..Default::default()
        }
    }

    /// Build a `Failure` response. Enforces the `Failure ⇒ FailureReason ≠ ∅`
    /// invariant at construction time.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            status: Some(ExecutorStatus::Failure),
            failure_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Build a `UserInputRequired` response. Enforces the
    /// `UserInputRequired ⇒ Inputs ≠ ∅` invariant; panics on an empty list
    /// because that would be a programming error in the executor, not a
    /// recoverable flow condition.
    pub fn user_input_required(inputs: Vec<Input>) -> Self {
        assert!(
            !inputs.is_empty(),
            "UserInputRequired response must carry at least one Input"
        );
        Self {
            status: Some(ExecutorStatus::UserInputRequired),
            inputs,
            ..Default::default()
        }
    }

    /// Build an `ExternalRedirection` response. Enforces the
    /// `ExternalRedirection ⇒ RedirectURL ≠ ∅` invariant.
    pub fn external_redirection(redirect_url: impl Into<String>) -> Self {
        let redirect_url = redirect_url.into();
        assert!(
            !redirect_url.is_empty(),
            "ExternalRedirection response must carry a non-empty RedirectURL"
        );
        Self {
            status: Some(ExecutorStatus::ExternalRedirection),
            redirect_url: Some(redirect_url),
            ..Default::default()
        }
    }

    pub fn with_authenticated_user(mut self, user: AuthenticatedUser) -> Self {
        self.authenticated_user = Some(user);
        self
    }

    pub fn with_runtime_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.runtime_data.insert(key.into(), value.into());
        self
    }

    pub fn with_additional_data(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.additional_data.insert(key.into(), value.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_assertion(mut self, assertion: impl Into<String>) -> Self {
        self.assertion = Some(assertion.into());
        self
    }

    pub fn is_failure(&self) -> bool {
        self.status == Some(ExecutorStatus::Failure)
    }
}

/// Render an [`AttrValue`] map's string-rendered values as `RuntimeData`
/// entries — used wherever a non-string attribute needs to be dropped into
/// the flat `RuntimeData` string map.
pub fn render_runtime_entries(
    attrs: &HashMap<String, AttrValue>,
) -> HashMap<String, String> {
    attrs
        .iter()
        .map(|(k, v)| (k.clone(), v.to_display_string()))
        .collect()
}
