//! The object-safe [`Executor`] contract every concrete executor implements.

use async_trait::async_trait;

use crate::context::NodeContext;
use crate::error::ExecutorError;
use crate::response::ExecutorResponse;

/// One named, reusable step of a flow.
///
/// Every concrete executor — Basic-Auth, SMS-OTP, the OAuth/OIDC family,
/// Attribute-Collector, and so on — implements this single entry point.
/// The trait is deliberately thin and object-safe: the registry holds
/// heterogeneous executors behind `Arc<dyn Executor>`, so there is no room
/// for generic associated types the way a typed node-graph interpreter
/// might use.
#[async_trait]
pub trait Executor: Send + Sync {
    /// The name this executor is registered under (e.g. `"BasicAuthExecutor"`).
    fn name(&self) -> &str;

    /// Run this executor for one node step.
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError>;
}
