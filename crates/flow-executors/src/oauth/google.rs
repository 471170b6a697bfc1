//! `GoogleExecutor` — a one-screen configuration shim over [`OidcExecutor`]
//! (§4.5, §9).

use std::sync::Arc;

use flow_collab::{OidcService, UserService};

use super::oidc_executor::OidcExecutor;

pub const NAME: &str = "GoogleExecutor";

pub fn new<S>(google: Arc<S>, users: Arc<dyn UserService>) -> OidcExecutor
where
    S: OidcService + 'static,
{
    OidcExecutor::named(google, users, NAME)
}
