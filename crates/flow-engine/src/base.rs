//! [`BaseExecutor`] — the shared input/prerequisite-checking behavior every
//! concrete executor composes from.
//!
//! Rather than an inheritance hierarchy, each concrete executor holds a
//! `BaseExecutor` value (built from its declared default inputs and
//! prerequisites) and calls through to it. Executors with richer semantics
//! (Attribute-Collector, SMS-OTP) layer additional passes on top instead of
//! overriding these methods.

use crate::context::{Input, NodeContext};
use crate::response::ExecutorResponse;

/// Declarative input/prerequisite checking, shared by composition across
/// concrete executors.
#[derive(Debug, Clone, Default)]
pub struct BaseExecutor {
    default_inputs: Vec<Input>,
    prerequisites: Vec<Input>,
}

impl BaseExecutor {
    pub fn new(default_inputs: Vec<Input>, prerequisites: Vec<Input>) -> Self {
        Self {
            default_inputs,
            prerequisites,
        }
    }

    pub fn default_inputs(&self) -> &[Input] {
        &self.default_inputs
    }

    pub fn prerequisites(&self) -> &[Input] {
        &self.prerequisites
    }

    /// The inputs to check for a given context: `ctx.node_inputs` if the
    /// flow author declared any, else this executor's `default_inputs`.
    pub fn required_inputs<'a>(&'a self, ctx: &'a NodeContext) -> &'a [Input] {
        if ctx.node_inputs.is_empty() {
            &self.default_inputs
        } else {
            &ctx.node_inputs
        }
    }

    /// Check `ctx.user_inputs` then `ctx.runtime_data` for every required
    /// entry in `required_inputs`. Missing entries are appended to
    /// `resp.inputs`. Returns `true` iff nothing was missing.
    pub fn has_required_inputs(&self, ctx: &NodeContext, resp: &mut ExecutorResponse) -> bool {
        Self::check(self.required_inputs(ctx), ctx, resp)
    }

    /// Same shape as [`Self::has_required_inputs`], applied to the declared
    /// prerequisites instead of node inputs.
    pub fn validate_prerequisites(&self, ctx: &NodeContext, resp: &mut ExecutorResponse) -> bool {
        Self::check(&self.prerequisites, ctx, resp)
    }

    fn check(inputs: &[Input], ctx: &NodeContext, resp: &mut ExecutorResponse) -> bool {
        let mut all_present = true;
        for input in inputs {
            if !input.required {
                continue;
            }
            let present = ctx
                .user_inputs
                .get(&input.identifier)
                .map(|v| !v.is_empty())
                .unwrap_or(false)
                || ctx
                    .runtime_data
                    .get(&input.identifier)
                    .map(|v| !v.is_empty())
                    .unwrap_or(false);
            if !present {
                all_present = false;
                resp.inputs.push(input.clone());
            }
        }
        all_present
    }

    /// `RuntimeData["userID"]` if present, else empty.
    pub fn user_id_from_context(ctx: &NodeContext) -> &str {
        ctx.runtime_data
            .get("userID")
            .map(String::as_str)
            .unwrap_or("")
    }
}
