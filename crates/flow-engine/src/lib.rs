//! `flow-engine` — core data model, executor contract, and registry for the
//! identity-flow execution engine.
//!
//! This crate defines the shapes the outer flow scheduler and every concrete
//! executor agree on ([`NodeContext`], [`ExecutorResponse`]), the object-safe
//! [`Executor`] trait concrete executors implement, the shared
//! [`BaseExecutor`] input/prerequisite-checking helper, and the
//! [`ExecutorRegistry`] that looks executors up by name at flow-scheduling
//! time.

pub mod base;
pub mod context;
pub mod error;
pub mod executor;
pub mod policy;
pub mod registry;
pub mod response;
pub mod value;

pub use base::BaseExecutor;
pub use context::{
    ApplicationView, AuthenticatedUser, ExecutionHistoryEntry, ExecutorType, FlowType,
    HistoryStatus, HttpContext, Input, InputType, NodeContext, TokenPolicy, UserTypeConfig,
};
pub use error::ExecutorError;
pub use executor::Executor;
pub use policy::{HttpRequestLimits, InvitePolicy, JwtPolicy, OtpPolicy};
pub use registry::ExecutorRegistry;
pub use response::{render_runtime_entries, ExecutorResponse, ExecutorStatus, Meta};
pub use value::{AttrMap, AttrValue};
