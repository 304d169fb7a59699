//! Junior agent: data retrieval and basic analysis

use super::{AgentResponse, AgentRole, RoleAgent};
use crate::config::StockConfig;
use stock_agent_runtime::AgentRuntime;
use stock_agent_utils::Settings;

/// Fetches prices, company data and history, and runs simple analysis
pub struct JuniorAgent {
    inner: RoleAgent,
}

impl JuniorAgent {
    pub fn new(runtime: &AgentRuntime, settings: &Settings, config: &StockConfig) -> Self {
        Self {
            inner: RoleAgent::new(runtime, AgentRole::Junior, settings, config),
        }
    }

    /// The underlying role agent
    pub fn agent(&self) -> &RoleAgent {
        &self.inner
    }

    /// Run a free-form request
    pub async fn run(&self, input: impl Into<String>) -> AgentResponse {
        self.inner.run(input).await
    }

    pub async fn get_stock_price(&self, symbol: &str) -> AgentResponse {
        self.run(format!("Get the current stock price for {symbol}")).await
    }

    pub async fn get_stock_info(&self, symbol: &str) -> AgentResponse {
        self.run(format!(
            "Get detailed information about {symbol} including company name, sector, market cap, and key metrics"
        ))
        .await
    }

    /// `period` is one of the history tool's periods, e.g. `1mo`
    pub async fn get_stock_history(&self, symbol: &str, period: &str) -> AgentResponse {
        self.run(format!("Get historical data for {symbol} for the past {period}"))
            .await
    }

    pub async fn analyze_stock(&self, symbol: &str) -> AgentResponse {
        self.run(format!(
            "Perform a basic technical analysis for {symbol} including trend analysis, moving averages, and support/resistance levels"
        ))
        .await
    }

    pub async fn compare_stocks(&self, symbols: &[String]) -> AgentResponse {
        self.run(format!(
            "Compare the following stocks: {}. Provide current prices, basic metrics, and a brief comparison",
            symbols.join(", ")
        ))
        .await
    }

    pub fn capabilities(&self) -> &'static [&'static str] {
        AgentRole::Junior.capabilities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::base::tests::{runtime, settings};
    use crate::test_support::RoleProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_operations_build_instructions() {
        let provider = Arc::new(RoleProvider::new());
        let junior = JuniorAgent::new(
            &runtime(Arc::clone(&provider)),
            &settings(),
            &StockConfig::default(),
        );

        let response = junior.get_stock_history("NVDA", "6mo").await;
        assert!(response.success);
        junior
            .compare_stocks(&["AAPL".to_string(), "MSFT".to_string()])
            .await;

        let inputs = provider.inputs();
        assert_eq!(inputs[0], "Get historical data for NVDA for the past 6mo");
        assert!(inputs[1].starts_with("Compare the following stocks: AAPL, MSFT."));
        assert_eq!(provider.roles_seen(), vec!["Junior", "Junior"]);
    }

    #[test]
    fn test_capabilities() {
        let junior = JuniorAgent::new(
            &runtime(Arc::new(RoleProvider::new())),
            &settings(),
            &StockConfig::default(),
        );
        assert!(junior.capabilities().contains(&"Compare multiple stocks"));
    }
}
