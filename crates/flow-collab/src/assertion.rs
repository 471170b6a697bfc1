//! Assurance-assertion contract consumed by the Auth-Assertion executor's
//! assurance-claim composition (§4.9).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// One authentication method contributing to the assurance claim, already
/// renumbered to its sequential step (1..N) by the executor before this call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssuranceReference {
    pub authenticator: String,
    pub step: u32,
}

#[async_trait]
pub trait AssertionGenerator: Send + Sync {
    async fn generate_assertion(
        &self,
        references: &[AssuranceReference],
    ) -> Result<serde_json::Value, ServiceError>;
}
