//! Deterministic in-memory test doubles for every collaborator trait,
//! modeled on the teacher's `nodes::mock::MockNode`.

pub mod credentials;
pub mod idp;
pub mod oauth;
pub mod otp;
pub mod schema;
pub mod users;

pub use credentials::FakeCredentialsAuthService;
pub use idp::FakeIdpService;
pub use oauth::{FakeIdpEntry, FakeOAuthService};
pub use otp::FakeOtpService;
pub use schema::FakeUserSchemaService;
pub use users::FakeUserService;
