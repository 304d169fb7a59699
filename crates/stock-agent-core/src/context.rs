//! Execution context for agents
//!
//! The `Context` struct is a key-value store carried through one request. The
//! orchestrator records routing decisions in it and the system facade seeds it
//! with the session id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Session ID for tracking
    pub const SESSION_ID: &str = "session_id";
    /// Ticker symbols the request is about
    pub const SYMBOLS: &str = "symbols";
    /// Name of the sub-agent a request was routed to
    pub const ROUTED_AGENT: &str = "routed_agent";
    /// Complexity class assigned by the orchestrator
    pub const COMPLEXITY: &str = "complexity";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use stock_agent_core::Context;
///
/// let ctx = Context::new()
///     .with_session_id("session-123")
///     .with_symbols(vec!["AAPL".to_string()]);
///
/// assert_eq!(ctx.session_id(), Some("session-123"));
/// assert_eq!(ctx.symbols(), vec!["AAPL".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session ID
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.insert(keys::SESSION_ID, serde_json::json!(session_id.into()));
        self
    }

    /// Set the symbols this request is about
    pub fn with_symbols(mut self, symbols: Vec<String>) -> Self {
        self.insert(keys::SYMBOLS, serde_json::json!(symbols));
        self
    }

    /// Get the session ID
    pub fn session_id(&self) -> Option<&str> {
        self.get(keys::SESSION_ID).and_then(|v| v.as_str())
    }

    /// Get the symbols, empty when none were recorded
    pub fn symbols(&self) -> Vec<String> {
        self.get_typed(keys::SYMBOLS).ok().flatten().unwrap_or_default()
    }

    /// Record which sub-agent handled the request
    pub fn set_routed_agent(&mut self, agent: &str) {
        self.insert(keys::ROUTED_AGENT, serde_json::json!(agent));
    }

    /// Get the sub-agent that handled the request
    pub fn routed_agent(&self) -> Option<&str> {
        self.get(keys::ROUTED_AGENT).and_then(|v| v.as_str())
    }

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    ///
    /// Serializes the value to JSON before storing.
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Get the number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
