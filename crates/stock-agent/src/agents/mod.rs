//! Junior, Master and Orchestrator agents

pub mod base;
pub mod junior;
pub mod master;
pub mod orchestrator;
pub mod role;

pub use base::{AgentResponse, RoleAgent};
pub use junior::JuniorAgent;
pub use master::{DEFAULT_OUTLOOK_TIMEFRAME, MasterAgent};
pub use orchestrator::{
    AgentInfo, AgentStatus, Complexity, OrchestratorAgent, WorkflowRecord, assess_complexity,
};
pub use role::AgentRole;
