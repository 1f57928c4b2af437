//! Goal-driven plan-mutation agent.
//!
//! One invocation = one session: fetch a snapshot of the plan once, then
//! loop planner → dispatch → observe until the planner calls `done` or the
//! iteration cap is reached.

mod command;
mod dispatch;
mod main_loop;
mod resolver;
mod snapshot;
mod tool_defs;


pub use command::ExecutionResult;
pub use main_loop::{GoalOutcome, GoalRequest, Termination};
pub use snapshot::PlanSnapshot;

use std::sync::Arc;

use crate::traits::{ModelProvider, PlanStore};

/// Hard upper bound on planner round trips per session.
pub const MAX_ITERATIONS: usize = 5;

/// Upper bound on entries accepted in one bulk shopping-item create.
pub const MAX_BULK_ITEMS: usize = 50;

pub struct Agent {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn PlanStore>,
    model: String,
    max_iterations: usize,
}

impl Agent {
    pub fn new(provider: Arc<dyn ModelProvider>, store: Arc<dyn PlanStore>, model: &str) -> Self {
        Self {
            provider,
            store,
            model: model.to_string(),
            max_iterations: MAX_ITERATIONS,
        }
    }
}
