//! `GitHubExecutor` — a one-screen configuration shim over [`OAuthExecutor`]
//! (§4.5, §9: "one-screen configuration shims, not a subclass hierarchy").

use std::sync::Arc;

use flow_collab::{OAuthService, UserService};

use super::oauth_executor::OAuthExecutor;

pub const NAME: &str = "GitHubExecutor";

pub fn new(github: Arc<dyn OAuthService>, users: Arc<dyn UserService>) -> OAuthExecutor {
    OAuthExecutor::named(github, users, NAME)
}
