//! The OAuth/OIDC executor family (§4.5): a shared [`core::OAuthCore`] plus
//! four registrable executors built on top of it.

pub mod core;
pub mod github;
pub mod google;
pub mod oauth_executor;
pub mod oidc_executor;

pub use oauth_executor::OAuthExecutor;
pub use oidc_executor::OidcExecutor;
