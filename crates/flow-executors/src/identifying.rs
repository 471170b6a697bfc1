//! Identifying / Identity-Resolver executors (§4.10): both registered names
//! share the same lookup-by-filter logic — strip non-searchable keys, call
//! the user-identifier service, fail on not-found.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use flow_collab::{IdentifyFilters, UserService};
use flow_engine::{Executor, ExecutorError, ExecutorResponse, NodeContext};

use crate::try_service;

/// Filter keys that never identify a user and must never reach the
/// identifier service (credential material, one-time codes).
const NON_SEARCHABLE_KEYS: &[&str] = &["password", "code", "nonce", "otp"];

async fn identify(users: &Arc<dyn UserService>, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
    let filters: IdentifyFilters = ctx
        .user_inputs
        .iter()
        .filter(|(k, _)| !NON_SEARCHABLE_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let found = try_service!(users.identify_user(&filters).await);
    match found {
        Some(user) if !user.id.is_empty() => {
            Ok(ExecutorResponse::complete().with_runtime_data("userID", user.id))
        }
        _ => Ok(ExecutorResponse::failure("userNotFound")),
    }
}

pub const IDENTIFYING_NAME: &str = "IdentifyingExecutor";

pub struct IdentifyingExecutor {
    users: Arc<dyn UserService>,
}

impl IdentifyingExecutor {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Executor for IdentifyingExecutor {
    fn name(&self) -> &str {
        IDENTIFYING_NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = IDENTIFYING_NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        identify(&self.users, ctx).await
    }
}

pub const IDENTITY_RESOLVER_NAME: &str = "IdentityResolverExecutor";

/// Registered under a second node-facing name; same lookup-by-filter
/// algorithm as [`IdentifyingExecutor`].
pub struct IdentityResolverExecutor {
    users: Arc<dyn UserService>,
}

impl IdentityResolverExecutor {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Executor for IdentityResolverExecutor {
    fn name(&self) -> &str {
        IDENTITY_RESOLVER_NAME
    }

    #[instrument(skip(self, ctx), fields(flow_id = %ctx.flow_id, node_id = %ctx.current_node_id, executor = IDENTITY_RESOLVER_NAME))]
    async fn execute(&self, ctx: &NodeContext) -> Result<ExecutorResponse, ExecutorError> {
        identify(&self.users, ctx).await
    }
}
