//! Scripted LLM providers for agent tests

use async_trait::async_trait;
use std::sync::Mutex;
use stock_agent_llm::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Result as LlmResult,
};

/// Answers by role, identified from the system prompt, and records requests
///
/// A role listed in `failing` gets a provider error instead of an answer.
pub(crate) struct RoleProvider {
    failing: Vec<&'static str>,
    pub(crate) requests: Mutex<Vec<CompletionRequest>>,
}

impl RoleProvider {
    pub(crate) fn new() -> Self {
        Self {
            failing: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(roles: &[&'static str]) -> Self {
        Self {
            failing: roles.to_vec(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Role of every request so far, in arrival order
    pub(crate) fn roles_seen(&self) -> Vec<&'static str> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| role_of(r.system.as_deref().unwrap_or_default()))
            .collect()
    }

    /// Latest user text of every request so far
    pub(crate) fn inputs(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.messages.last().and_then(|m| m.text()).map(str::to_string))
            .collect()
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn role_of(system: &str) -> &'static str {
    if system.contains("Junior Stock Analyst") {
        "Junior"
    } else if system.contains("Master Stock Analyst") {
        "Master"
    } else if system.contains("Orchestrator Agent") {
        "Orchestrator"
    } else {
        "unknown"
    }
}

#[async_trait]
impl LLMProvider for RoleProvider {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let role = role_of(request.system.as_deref().unwrap_or_default());
        self.requests.lock().unwrap().push(request);

        if self.failing.contains(&role) {
            return Err(LLMError::RequestFailed(format!("{role} unavailable")));
        }
        Ok(CompletionResponse::text(format!("{role} report")))
    }

    fn name(&self) -> &str {
        "role-scripted"
    }
}
