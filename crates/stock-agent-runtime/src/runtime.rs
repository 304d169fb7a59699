//! Runtime holding the shared provider and tool registry
//!
//! Every agent created here talks to the same `LLMProvider` and sees the same
//! `ToolRegistry`; only the executor configuration differs per agent.

use std::sync::Arc;
use stock_agent_llm::LLMProvider;
use stock_agent_tools::ToolRegistry;
use tracing::debug;

use crate::agents::ToolAgent;
use crate::executor::{AgentExecutor, ExecutorConfig};

/// Factory for tool agents sharing one provider and registry
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
}

impl AgentRuntime {
    /// Create a new agent runtime
    pub fn new(provider: Arc<dyn LLMProvider>, tool_registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            tool_registry,
        }
    }

    /// Get a reference to the LLM provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get a reference to the tool registry
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Create a tool-using agent
    pub fn create_tool_agent(&self, config: ExecutorConfig, name: impl Into<String>) -> ToolAgent {
        let name = name.into();
        debug!(
            agent = %name,
            model = %config.model,
            temperature = ?config.temperature,
            max_iterations = config.max_iterations,
            "Creating tool agent"
        );
        let executor =
            AgentExecutor::new(self.provider.clone(), self.tool_registry.clone(), config);
        ToolAgent::new(executor, name)
    }
}
