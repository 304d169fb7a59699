//! Agent runtime for the stock analysis agents
//!
//! [`AgentExecutor`] runs the model/tool loop, [`ToolAgent`] exposes it through
//! the `Agent` trait and [`AgentRuntime`] hands out agents that share one
//! provider and tool registry.

pub mod agents;
pub mod executor;
pub mod runtime;

pub use agents::ToolAgent;
pub use executor::{AgentExecutor, ExecutorConfig, MAX_ITERATIONS_REACHED};
pub use runtime::AgentRuntime;
