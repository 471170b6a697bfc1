//! JWT-signing contract consumed by the Auth-Assertion executor (§4.9).

use async_trait::async_trait;

use flow_engine::AttrMap;

use crate::error::ServiceError;

#[async_trait]
pub trait JwtService: Send + Sync {
    /// Sign a JWT with the given subject, audience, issuer, validity, and
    /// extra claims. The signature scheme itself is owned entirely by the
    /// implementation; this core only supplies claim content.
    #[allow(clippy::too_many_arguments)]
    async fn generate_jwt(
        &self,
        subject: &str,
        audience: &str,
        issuer: &str,
        validity_seconds: i64,
        claims: AttrMap,
    ) -> Result<String, ServiceError>;
}
