//! `flow-collab` — abstract contracts for the external collaborators the
//! identity-flow core consumes, plus in-memory test doubles.
//!
//! Per spec §6, this core never talks to a concrete user store, OAuth/OIDC
//! provider, OTP gateway, or JWT signer directly — it only calls through the
//! traits defined here. Each trait returns either a typed success or a
//! [`ServiceError`] tagged `ClientError`/`ServerError` (§7); executors fold
//! the former into a `Failure` response and propagate the latter.
//!
//! The `testkit` module ships a deterministic in-memory fake for every
//! trait, modeled on the teacher's `nodes::mock::MockNode`, so
//! `flow-executors`' test suite never depends on a live backend.

pub mod assertion;
pub mod authorization;
pub mod credentials;
pub mod error;
pub mod http;
pub mod idp;
pub mod jwt;
pub mod oauth;
pub mod otp;
pub mod ou;
pub mod schema;
pub mod user;

pub mod testkit;

pub use assertion::{AssertionGenerator, AssuranceReference};
pub use authorization::AuthorizationService;
pub use credentials::CredentialsAuthService;
pub use error::ServiceError;
pub use http::{HttpClient, HttpMethod, HttpRequestSpec, HttpResponse, ReqwestHttpClient};
pub use idp::{IdentityProvider, IdpService};
pub use jwt::JwtService;
pub use oauth::{AuthorizeUrl, OAuthClientConfig, OAuthService, OidcService, TokenResponse};
pub use otp::{OtpChannel, OtpService, OtpVerificationStatus, SendOtpResult, VerifyOtpResult};
pub use ou::{CreateOrganizationUnitRequest, OrganizationUnit, OuConflict, OuCreationError, OuService};
pub use schema::{UserSchema, UserSchemaService};
pub use user::{IdentifyFilters, UserRecord, UserService};
