//! Shared pieces of the Junior, Master and Orchestrator agents

use super::AgentRole;
use crate::config::StockConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use stock_agent_core::{Agent, Context, Result};
use stock_agent_llm::Message;
use stock_agent_runtime::agents::ToolAgent;
use stock_agent_runtime::{AgentRuntime, ExecutorConfig};
use stock_agent_tools::ToolRegistry;
use stock_agent_utils::Settings;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Exchanges (user message plus reply) each agent remembers
pub const MAX_MEMORY_TURNS: usize = 20;

/// Outcome of one agent run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Agent that produced the response
    pub agent: String,
    pub input: String,
    pub output: String,
    pub success: bool,
    /// Sub-agents the orchestrator delegated to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResponse {
    pub fn success(agent: impl Into<String>, input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            input: input.into(),
            output: output.into(),
            success: true,
            sub_agents: Vec::new(),
            error: None,
        }
    }

    /// Failed run; the output carries a readable error line
    pub fn failure(agent: impl Into<String>, input: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            agent: agent.into(),
            input: input.into(),
            output: format!("Error: {error}"),
            success: false,
            sub_agents: Vec::new(),
            error: Some(error),
        }
    }

    pub fn with_sub_agents(mut self, sub_agents: Vec<String>) -> Self {
        self.sub_agents = sub_agents;
        self
    }
}

/// A tool agent playing one [`AgentRole`]
///
/// Successful exchanges are kept as conversation memory and replayed before
/// the next input, up to [`MAX_MEMORY_TURNS`].
pub struct RoleAgent {
    role: AgentRole,
    agent: ToolAgent,
    tools: Arc<ToolRegistry>,
    memory: RwLock<VecDeque<Message>>,
}

impl RoleAgent {
    /// Build the role's executor from the environment settings
    pub fn new(
        runtime: &AgentRuntime,
        role: AgentRole,
        settings: &Settings,
        config: &StockConfig,
    ) -> Self {
        let executor_config = ExecutorConfig {
            max_iterations: settings.max_iterations,
            model: settings.openai_model.clone(),
            system_prompt: Some(role.system_prompt().to_string()),
            max_tokens: config.max_tokens,
            temperature: Some(role.temperature(settings)),
        };

        Self {
            role,
            agent: runtime.create_tool_agent(executor_config, role.name()),
            tools: Arc::clone(runtime.tools()),
            memory: RwLock::new(VecDeque::new()),
        }
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn executor_config(&self) -> &ExecutorConfig {
        self.agent.executor().config()
    }

    /// Number of tools the agent can call
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Messages currently remembered, oldest first
    pub async fn memory(&self) -> Vec<Message> {
        self.memory.read().await.iter().cloned().collect()
    }

    pub async fn memory_len(&self) -> usize {
        self.memory.read().await.len()
    }

    pub async fn clear_memory(&self) {
        self.memory.write().await.clear();
        debug!(agent = self.role.name(), "Conversation memory cleared");
    }

    /// One exchange on top of the remembered conversation
    async fn respond(&self, input: &str) -> Result<String> {
        let history = self.memory().await;
        let output = self
            .agent
            .executor()
            .run_with_history(input.to_string(), history)
            .await?;

        let mut memory = self.memory.write().await;
        memory.push_back(Message::user(input));
        memory.push_back(Message::assistant(output.clone()));
        while memory.len() > MAX_MEMORY_TURNS * 2 {
            memory.pop_front();
        }
        Ok(output)
    }

    /// Run the agent; failures become unsuccessful responses
    pub async fn run(&self, input: impl Into<String>) -> AgentResponse {
        let input = input.into();
        let started = Instant::now();

        match self.respond(&input).await {
            Ok(output) => {
                info!(
                    agent = self.role.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Agent run completed"
                );
                AgentResponse::success(self.role.name(), input, output)
            }
            Err(e) => {
                warn!(agent = self.role.name(), error = %e, "Agent run failed");
                AgentResponse::failure(self.role.name(), input, e.to_string())
            }
        }
    }
}

#[async_trait]
impl Agent for RoleAgent {
    async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
        self.respond(&input).await
    }

    fn name(&self) -> &str {
        self.role.name()
    }
}
