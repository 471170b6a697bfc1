//! Crate-wide error type for propagated (non-`Failure`) outcomes.
//!
//! A `Status=Failure` response is a normal, user-facing `ExecutorResponse`
//! value — not an error. `ExecutorError` is reserved for the other kind of
//! bad outcome: transport/server failures the scheduler itself decides how
//! to retry or abort, and invariant violations that indicate a bug upstream
//! of this executor rather than bad user input.

use thiserror::Error;

/// Errors an executor's `execute` may propagate instead of returning a
/// `Failure` response.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// A downstream collaborator reported a server-side failure (5xx,
    /// timeout, unavailable). The scheduler may retry the whole step.
    #[error("collaborator server error: {0}")]
    CollaboratorServerError(String),

    /// A required piece of server-side state was missing where the
    /// invariants of this core guarantee it should be present (e.g. SMS-OTP
    /// `verify` mode with no `otpSessionToken` in `RuntimeData`).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The node was configured in a way this executor cannot act on (e.g. an
    /// HTTP-Request node with no `url`, or an OAuth node with no `idpId`).
    #[error("invalid node configuration: {0}")]
    Configuration(String),

    /// Catch-all for collaborator-layer errors that don't fit the above.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_stable() {
        assert_eq!(
            ExecutorError::InvariantViolation("missing otpSessionToken".into()).to_string(),
            "invariant violation: missing otpSessionToken"
        );
        assert_eq!(
            ExecutorError::Configuration("missing senderId".into()).to_string(),
            "invalid node configuration: missing senderId"
        );
    }
}
