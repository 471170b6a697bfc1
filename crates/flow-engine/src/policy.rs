//! Tunable knobs a handful of executors need, pulled out of call sites into
//! one configuration struct.
//!
//! Grounded in the teacher's `ExecutorConfig{max_retries, retry_base_delay}`
//! (`crates/engine/src/executor.rs`): rather than hard-coding `3` at the
//! SMS-OTP call site or `20` at the HTTP-Request call site, each is a field
//! here with a `Default` matching the spec's hard-coded values exactly, so a
//! deployment can override it without patching executor bodies.
use std::time::Duration;

/// Policy knobs for SMS-OTP.
#[derive(Debug, Clone, Copy)]
pub struct OtpPolicy {
    /// Maximum `send`-mode attempts before SMS-OTP fails permanently.
    pub max_attempts: u32,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// Policy knobs for the HTTP-Request executor's configuration caps.
#[derive(Debug, Clone, Copy)]
pub struct HttpRequestLimits {
    pub max_timeout: Duration,
    pub default_timeout: Duration,
    pub max_retry_count: u32,
    pub max_retry_delay: Duration,
}

impl Default for HttpRequestLimits {
    fn default() -> Self {
        Self {
            max_timeout: Duration::from_secs(20),
            default_timeout: Duration::from_secs(10),
            max_retry_count: 5,
            max_retry_delay: Duration::from_millis(5000),
        }
    }
}

/// Fallback JWT claims used by Auth-Assertion when the application itself
/// has no `Token` policy configured — "the process JWT config".
#[derive(Debug, Clone)]
pub struct JwtPolicy {
    pub default_issuer: String,
    pub default_validity_seconds: i64,
}

impl Default for JwtPolicy {
    fn default() -> Self {
        Self {
            default_issuer: "identity-flow".to_string(),
            default_validity_seconds: 3600,
        }
    }
}

/// Policy knobs for the Invite executor.
#[derive(Debug, Clone)]
pub struct InvitePolicy {
    /// Base URL of the user-facing gate the invite link is built against,
    /// e.g. `https://gate.example.com`.
    pub gate_base_url: String,
}

impl Default for InvitePolicy {
    fn default() -> Self {
        Self {
            gate_base_url: "https://gate.example.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_hard_coded_values() {
        assert_eq!(OtpPolicy::default().max_attempts, 3);
        let limits = HttpRequestLimits::default();
        assert_eq!(limits.max_timeout, Duration::from_secs(20));
        assert_eq!(limits.default_timeout, Duration::from_secs(10));
        assert_eq!(limits.max_retry_count, 5);
        assert_eq!(limits.max_retry_delay, Duration::from_millis(5000));
    }

    #[test]
    fn jwt_policy_has_sane_defaults() {
        let policy = JwtPolicy::default();
        assert!(!policy.default_issuer.is_empty());
        assert!(policy.default_validity_seconds > 0);
    }
}
