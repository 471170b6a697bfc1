//! `FakeOtpService` — an in-memory test double for `OtpService`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ServiceError;
use crate::otp::{OtpChannel, OtpService, OtpVerificationStatus, SendOtpResult, VerifyOtpResult};

struct Session {
    recipient: String,
    code: String,
    consumed: bool,
}

/// Records every send and tracks outstanding sessions by token so
/// `verify_otp` can check a caller-supplied code against what was "sent".
pub struct FakeOtpService {
    sessions: Mutex<HashMap<String, Session>>,
    next_token: Mutex<u64>,
    pub sent: Mutex<Vec<(String, String, OtpChannel)>>,
    /// If set, `send_otp` fails with this error instead of creating a session.
    pub force_send_error: Option<ServiceError>,
}

impl FakeOtpService {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            next_token: Mutex::new(1),
            sent: Mutex::new(Vec::new()),
            force_send_error: None,
        }
    }

    pub fn failing_to_send(error: ServiceError) -> Self {
        Self {
            force_send_error: Some(error),
            ..Self::new()
        }
    }

    /// The code that was actually sent for a given session token, for test
    /// assertions that need to "receive" the OTP out of band.
    pub fn code_for(&self, session_token: &str) -> Option<String> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_token)
            .map(|s| s.code.clone())
    }
}

impl Default for FakeOtpService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpService for FakeOtpService {
    async fn send_otp(
        &self,
        recipient: &str,
        sender_id: &str,
        channel: OtpChannel,
    ) -> Result<SendOtpResult, ServiceError> {
        if let Some(err) = &self.force_send_error {
            return Err(err.clone());
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), sender_id.to_string(), channel));

        let mut next_token = self.next_token.lock().unwrap();
        let session_token = format!("otp-session-{}", *next_token);
        *next_token += 1;

        self.sessions.lock().unwrap().insert(
            session_token.clone(),
            Session {
                recipient: recipient.to_string(),
                code: "123456".to_string(),
                consumed: false,
            },
        );

        Ok(SendOtpResult { session_token })
    }

    async fn verify_otp(
        &self,
        session_token: &str,
        code: &str,
    ) -> Result<VerifyOtpResult, ServiceError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = match sessions.get_mut(session_token) {
            Some(s) => s,
            None => {
                return Ok(VerifyOtpResult {
                    status: OtpVerificationStatus::Expired,
                })
            }
        };

        if session.consumed {
            return Ok(VerifyOtpResult {
                status: OtpVerificationStatus::Expired,
            });
        }

        if session.code == code {
            session.consumed = true;
            Ok(VerifyOtpResult {
                status: OtpVerificationStatus::Verified,
            })
        } else {
            Ok(VerifyOtpResult {
                status: OtpVerificationStatus::Invalid,
            })
        }
    }
}
