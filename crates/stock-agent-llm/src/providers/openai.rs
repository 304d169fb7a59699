//! OpenAI chat-completions provider
//!
//! Works against `https://api.openai.com/v1` and any OpenAI-compatible base
//! URL (`OPENAI_API_BASE`). See: https://platform.openai.com/docs/api-reference/chat
//!
//! ```no_run
//! use stock_agent_llm::{CompletionRequest, LLMProvider, Message};
//! use stock_agent_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! # async fn run() -> stock_agent_llm::Result<()> {
//! let provider = OpenAIProvider::with_config(OpenAIConfig::new("sk-...").with_timeout(60))?;
//! let request = CompletionRequest::builder("gpt-4")
//!     .add_message(Message::user("Get the current stock price for AAPL"))
//!     .build();
//! let response = provider.complete(request).await?;
//! println!("{}", response.message.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage, ToolDefinition,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default base URL of the OpenAI API
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the OpenAI provider
#[derive(Clone)]
pub struct OpenAIConfig {
    /// API key for bearer authentication
    pub api_key: String,

    /// Base URL, without the trailing `/chat/completions`
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"***")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OpenAIConfig {
    /// Create a config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom API base URL (Azure, local OpenAI-compatible servers)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

/// OpenAI provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a provider with a custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LLMError::ConfigurationError(
                "OpenAI API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider with an API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = request.model.clone();
        let body = build_request(request);

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(LLMError::from_status(status.as_u16(), error_text, &model));
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| LLMError::UnexpectedResponse(format!("Failed to parse response: {e}")))?;

        parse_completion(openai_response)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl OpenAIMessage {
    fn text(role: &'static str, content: String) -> Self {
        Self {
            role,
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    tool_type: String,
    function: OpenAIFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: OpenAIUsage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

// Conversions

fn build_request(request: CompletionRequest) -> OpenAIRequest {
    OpenAIRequest {
        model: request.model,
        messages: build_openai_messages(request.system, request.messages),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        tools: request.tools.as_deref().map(convert_tools),
    }
}

/// System prompt goes first in the messages array
fn build_openai_messages(system: Option<String>, messages: Vec<Message>) -> Vec<OpenAIMessage> {
    let mut result: Vec<OpenAIMessage> = system
        .into_iter()
        .map(|sys| OpenAIMessage::text("system", sys))
        .collect();

    for msg in messages {
        result.extend(convert_message(msg));
    }

    result
}

/// One generic message may become several OpenAI messages: tool results are
/// sent as separate `tool` role messages.
fn convert_message(msg: Message) -> Vec<OpenAIMessage> {
    let role = match msg.role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    };

    match msg.content {
        Some(MessageContent::Text(text)) => vec![OpenAIMessage::text(role, text)],
        Some(MessageContent::Blocks(blocks)) => convert_blocks(role, blocks),
        None => vec![OpenAIMessage::text(role, String::new())],
    }
}

fn convert_blocks(role: &'static str, blocks: Vec<ContentBlock>) -> Vec<OpenAIMessage> {
    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    let mut tool_results = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => texts.push(text),
            ContentBlock::ToolUse { id, name, input } => tool_calls.push(OpenAIToolCall {
                id,
                tool_type: function_type(),
                function: OpenAIFunctionCall {
                    name,
                    arguments: input.to_string(),
                },
            }),
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => tool_results.push(OpenAIMessage {
                role: "tool",
                content: Some(content),
                tool_calls: None,
                tool_call_id: Some(tool_use_id),
            }),
        }
    }

    let mut messages = Vec::with_capacity(tool_results.len() + 1);
    if !texts.is_empty() || !tool_calls.is_empty() {
        messages.push(OpenAIMessage {
            role,
            content: if texts.is_empty() {
                None
            } else {
                Some(texts.join("\n"))
            },
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            tool_call_id: None,
        });
    }
    messages.extend(tool_results);
    messages
}

fn convert_tools(tools: &[ToolDefinition]) -> Vec<OpenAITool> {
    tools
        .iter()
        .map(|tool| OpenAITool {
            tool_type: "function",
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

fn parse_completion(response: OpenAIResponse) -> Result<CompletionResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

    let finish_reason = choice.finish_reason.unwrap_or_default();
    debug!(
        finish_reason = %finish_reason,
        prompt_tokens = response.usage.prompt_tokens,
        completion_tokens = response.usage.completion_tokens,
        "Received completion"
    );

    let message = parse_openai_message(choice.message)?;
    let stop_reason = if message.has_tool_uses() {
        StopReason::ToolUse
    } else {
        map_stop_reason(&finish_reason)
    };

    Ok(CompletionResponse {
        message,
        stop_reason,
        usage: TokenUsage {
            input_tokens: response.usage.prompt_tokens,
            output_tokens: response.usage.completion_tokens,
        },
    })
}

fn parse_openai_message(msg: OpenAIResponseMessage) -> Result<Message> {
    let mut blocks = Vec::new();

    if let Some(content) = msg.content.filter(|c| !c.is_empty()) {
        blocks.push(ContentBlock::Text { text: content });
    }

    for call in msg.tool_calls.unwrap_or_default() {
        let input: serde_json::Value = if call.function.arguments.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&call.function.arguments).map_err(|e| {
                LLMError::UnexpectedResponse(format!("Failed to parse tool arguments: {e}"))
            })?
        };

        blocks.push(ContentBlock::ToolUse {
            id: call.id,
            name: call.function.name,
            input,
        });
    }

    if blocks.is_empty() {
        blocks.push(ContentBlock::Text {
            text: String::new(),
        });
    }

    Ok(Message::assistant_blocks(blocks))
}

fn map_stop_reason(finish_reason: &str) -> StopReason {
    match finish_reason {
        "length" => StopReason::MaxTokens,
        "tool_calls" | "function_call" => StopReason::ToolUse,
        _ => StopReason::EndTurn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::schema;
    use serde_json::json;

    #[test]
    fn test_config_defaults_and_trailing_slash() {
        let config = OpenAIConfig::new("sk-test").with_api_base("http://localhost:1234/v1/");
        assert_eq!(config.api_base, "http://localhost:1234/v1");
        assert_eq!(
            config.completions_url(),
            "http://localhost:1234/v1/chat/completions"
        );
        assert_eq!(OpenAIConfig::new("k").timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = OpenAIConfig::new("sk-secret-value");
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret-value"));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            OpenAIProvider::new(""),
            Err(LLMError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_system_prompt_first() {
        let messages =
            build_openai_messages(Some("You are a Junior analyst".into()), vec![Message::user("hi")]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn test_tool_round_trip_messages() {
        let assistant = Message::assistant_blocks(vec![ContentBlock::ToolUse {
            id: "call_1".into(),
            name: "get_stock_price".into(),
            input: json!({"symbol": "AAPL"}),
        }]);
        let converted = convert_message(assistant);
        assert_eq!(converted.len(), 1);
        assert!(converted[0].content.is_none());
        let calls = converted[0].tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.arguments, r#"{"symbol":"AAPL"}"#);

        let result = Message::tool_result("call_1".into(), "Current price of AAPL: $190.00".into());
        let converted = convert_message(result);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].role, "tool");
        assert_eq!(converted[0].tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_convert_tools() {
        let tools = vec![ToolDefinition::new(
            "get_stock_price",
            "Latest price",
            schema::object(json!({"symbol": schema::string("Ticker")}), vec!["symbol"]),
        )];
        let converted = convert_tools(&tools);
        let value = serde_json::to_value(&converted).unwrap();
        assert_eq!(value[0]["type"], "function");
        assert_eq!(value[0]["function"]["name"], "get_stock_price");
    }

    #[test]
    fn test_request_omits_unset_fields() {
        let request = CompletionRequest::builder("gpt-4")
            .add_message(Message::user("hi"))
            .build();
        let value = serde_json::to_value(build_request(request)).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("temperature").is_none());
        assert_eq!(value["model"], "gpt-4");
    }

    #[test]
    fn test_parse_text_completion() {
        let raw = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "AAPL trades at $190"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 7}
        });
        let response: OpenAIResponse = serde_json::from_value(raw).unwrap();
        let completion = parse_completion(response).unwrap();
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.message.text(), Some("AAPL trades at $190"));
        assert_eq!(completion.usage.total(), 19);
    }

    #[test]
    fn test_parse_tool_call_completion() {
        let raw = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "analyze_stock", "arguments": "{\"symbol\":\"TSLA\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 1, "completion_tokens": 1}
        });
        let response: OpenAIResponse = serde_json::from_value(raw).unwrap();
        let completion = parse_completion(response).unwrap();
        assert_eq!(completion.stop_reason, StopReason::ToolUse);
        match completion.message.tool_uses()[0] {
            ContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "analyze_stock");
                assert_eq!(input["symbol"], "TSLA");
            }
            _ => panic!("Expected tool use"),
        }
    }

    #[test]
    fn test_parse_bad_arguments() {
        let raw = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{"id": "c", "function": {"name": "x", "arguments": "{not json"}}]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let response: OpenAIResponse = serde_json::from_value(raw).unwrap();
        assert!(matches!(
            parse_completion(response),
            Err(LLMError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_no_choices_is_error() {
        let response: OpenAIResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(parse_completion(response).is_err());
    }

    #[test]
    fn test_map_stop_reason() {
        assert_eq!(map_stop_reason("stop"), StopReason::EndTurn);
        assert_eq!(map_stop_reason("length"), StopReason::MaxTokens);
        assert_eq!(map_stop_reason("tool_calls"), StopReason::ToolUse);
        assert_eq!(map_stop_reason("content_filter"), StopReason::EndTurn);
    }

    #[tokio::test]
    #[ignore = "requires OPENAI_API_KEY and network access"]
    async fn test_live_completion() {
        let key = std::env::var("OPENAI_API_KEY").unwrap();
        let provider = OpenAIProvider::new(key).unwrap();
        let request = CompletionRequest::builder("gpt-4")
            .add_message(Message::user("Reply with OK"))
            .max_tokens(5)
            .build();
        let response = provider.complete(request).await.unwrap();
        assert!(response.message.text().is_some());
    }
}
