//! Agent executor for running agent loops
//!
//! One run is a bounded loop:
//! 1. Send the conversation and the registry's tool definitions to the model
//! 2. `EndTurn` returns the text, `MaxTokens` returns a truncation notice
//! 3. `ToolUse` executes every requested tool, appends the results and loops

use serde_json::Value;
use std::sync::Arc;
use stock_agent_core::{Error, Result};
use stock_agent_llm::{CompletionRequest, ContentBlock, LLMProvider, Message, StopReason};
use stock_agent_tools::ToolRegistry;
use tracing::{debug, info, warn};

/// Returned when the loop hits `max_iterations`
pub const MAX_ITERATIONS_REACHED: &str = "Max iterations reached without completion";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful stock analysis assistant.";

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of model turns per run
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "gpt-4".to_string(),
            system_prompt: None,
            max_tokens: stock_agent_llm::completion::DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
        }
    }

    /// Executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run the loop for a single user message
    pub async fn run(&self, user_message: String) -> Result<String> {
        self.run_with_history(user_message, Vec::new()).await
    }

    /// Run the loop after previous conversation messages
    pub async fn run_with_history(
        &self,
        user_message: String,
        history: Vec<Message>,
    ) -> Result<String> {
        let mut conversation = history;
        conversation.push(Message::user(user_message));
        self.run_conversation(conversation).await
    }

    async fn run_conversation(&self, mut conversation: Vec<Message>) -> Result<String> {
        let tools = self.tool_registry.definitions();
        let system = self
            .config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration,
                max_iterations = self.config.max_iterations,
                model = %self.config.model,
                tool_count = tools.len(),
                "Agent iteration started"
            );

            let mut builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .system(system.clone())
                .max_tokens(self.config.max_tokens)
                .tools(tools.clone());
            if let Some(temperature) = self.config.temperature {
                builder = builder.temperature(temperature);
            }

            let response = self
                .provider
                .complete(builder.build())
                .await
                .map_err(|e| Error::ProcessingFailed(e.to_string()))?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            match response.stop_reason {
                StopReason::EndTurn => {
                    let text = response.message.text().unwrap_or("No response").to_string();
                    info!(iteration, response_length = text.len(), "Agent completed");
                    return Ok(text);
                }
                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    return Ok("Response truncated due to token limit".to_string());
                }
                StopReason::ToolUse => {
                    let tool_results = self.execute_tools(&response.message).await?;
                    conversation.push(response.message);
                    if tool_results.is_empty() {
                        warn!("No tool calls despite ToolUse stop reason");
                        return Ok("Tool execution failed".to_string());
                    }
                    conversation.extend(tool_results);
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "Max iterations reached, stopping"
        );
        Ok(MAX_ITERATIONS_REACHED.to_string())
    }

    /// Tool failures become error results for the model; an unknown tool
    /// aborts the run.
    async fn execute_tools(&self, message: &Message) -> Result<Vec<Message>> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            let tool = self
                .tool_registry
                .get(name)
                .ok_or_else(|| Error::ProcessingFailed(format!("Tool not found: {name}")))?;

            debug!(tool_name = %name, tool_id = %id, input = %input, "Executing tool");
            let start = std::time::Instant::now();
            match tool.execute(input.clone()).await {
                Ok(result) => {
                    let text = result_text(result);
                    info!(
                        tool_name = %name,
                        duration_ms = start.elapsed().as_millis() as u64,
                        result_length = text.len(),
                        "Tool execution succeeded"
                    );
                    results.push(Message::tool_result(id.clone(), text));
                }
                Err(e) => {
                    warn!(tool_name = %name, error = %e, "Tool execution failed");
                    results.push(Message::tool_error(id.clone(), format!("Error: {e}")));
                }
            }
        }

        Ok(results)
    }
}

/// String results are passed through verbatim, anything else as JSON
fn result_text(result: Value) -> String {
    match result {
        Value::String(text) => text,
        other => other.to_string(),
    }
}
