//! Stock tools exposed to the agents
//!
//! Every tool reads through a [`MarketDataSource`] (normally the cached
//! [`MarketData`] composite) and answers with plain text for the model.

pub mod analysis;
pub mod provider_quote;
pub mod stock_data;
pub mod technical;

pub use provider_quote::ProviderQuoteTool;
pub use stock_data::{StockHistoryTool, StockInfoTool, StockPriceTool};
pub use technical::StockAnalysisTool;

use crate::api::{MarketData, MarketDataSource};
use crate::error::StockError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use stock_agent_core::Error as AgentError;
use stock_agent_tools::{Tool, ToolRegistry};
use stock_agent_utils::MarketDataProvider;

/// Input shared by the single-symbol tools
#[derive(Debug, Deserialize)]
pub(crate) struct SymbolParams {
    pub symbol: String,
}

/// Deserialize tool input and upper-case its symbol
pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, AgentError> {
    serde_json::from_value(params).map_err(|e| AgentError::InvalidInput(e.to_string()))
}

pub(crate) fn normalize_symbol(raw: &str) -> Result<String, AgentError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AgentError::InvalidInput("symbol must not be empty".to_string()));
    }
    Ok(symbol)
}

/// Errors that mean "nothing to report" rather than a failed call
pub(crate) fn is_missing_data(err: &StockError) -> bool {
    matches!(
        err,
        StockError::DataUnavailable { .. } | StockError::InvalidSymbol(_)
    )
}

/// The four market tools plus the keyed provider's quote tool when configured
pub fn stock_tools(market: &Arc<MarketData>, provider: MarketDataProvider) -> Vec<Arc<dyn Tool>> {
    let source: Arc<dyn MarketDataSource> = market.clone();
    let mut tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(StockPriceTool::new(Arc::clone(&source))),
        Arc::new(StockInfoTool::new(Arc::clone(&source))),
        Arc::new(StockHistoryTool::new(Arc::clone(&source))),
        Arc::new(StockAnalysisTool::new(source)),
    ];

    if let Some(primary) = market.primary() {
        if let Some(tool) = ProviderQuoteTool::for_provider(provider, Arc::clone(primary)) {
            tools.push(Arc::new(tool));
        }
    }
    tools
}

/// Register [`stock_tools`] into `registry`
pub fn register_stock_tools(
    registry: &ToolRegistry,
    market: &Arc<MarketData>,
    provider: MarketDataProvider,
) {
    for tool in stock_tools(market, provider) {
        registry.register(tool);
    }
}
