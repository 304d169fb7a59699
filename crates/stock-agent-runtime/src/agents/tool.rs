//! Tool agent implementation (wraps AgentExecutor)

use crate::executor::AgentExecutor;
use async_trait::async_trait;
use stock_agent_core::{Agent, Context, Result};

/// An agent that runs the LLM loop with tool execution
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
}

impl ToolAgent {
    /// Create a new tool agent
    pub fn new(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
        }
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
        self.executor.run(input).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
