//! OTP provider contract consumed by the SMS-OTP executor (§4.4).

use async_trait::async_trait;

use crate::error::ServiceError;

/// Delivery channel for an OTP. SMS is the only channel this spec exercises,
/// but the contract leaves room for others (email, voice) an IdP config
/// might route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpChannel {
    Sms,
}

/// Outcome of an OTP verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpVerificationStatus {
    Verified,
    Invalid,
    Expired,
}

#[derive(Debug, Clone)]
pub struct SendOtpResult {
    pub session_token: String,
}

#[derive(Debug, Clone)]
pub struct VerifyOtpResult {
    pub status: OtpVerificationStatus,
}

/// Contract for the OTP delivery/verification backend.
#[async_trait]
pub trait OtpService: Send + Sync {
    async fn send_otp(
        &self,
        recipient: &str,
        sender_id: &str,
        channel: OtpChannel,
    ) -> Result<SendOtpResult, ServiceError>;

    async fn verify_otp(
        &self,
        session_token: &str,
        code: &str,
    ) -> Result<VerifyOtpResult, ServiceError>;
}
