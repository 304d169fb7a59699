//! Quote straight from the keyed provider, bypassing the cache and fallback

use super::{SymbolParams, is_missing_data, normalize_symbol, parse_params};
use crate::api::MarketDataSource;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use stock_agent_core::{Error as AgentError, Result as AgentResult};
use stock_agent_llm::tools::schema;
use stock_agent_tools::Tool;
use stock_agent_utils::MarketDataProvider;
use tracing::debug;

/// `alpha_vantage_quote` or `finnhub_quote`
pub struct ProviderQuoteTool {
    name: &'static str,
    description: &'static str,
    source: Arc<dyn MarketDataSource>,
}

impl ProviderQuoteTool {
    /// Tool for a keyed provider; `None` for Yahoo, which the other tools cover
    pub fn for_provider(
        provider: MarketDataProvider,
        source: Arc<dyn MarketDataSource>,
    ) -> Option<Self> {
        let (name, description) = match provider {
            MarketDataProvider::AlphaVantage => (
                "alpha_vantage_quote",
                "Get a real-time stock quote from the Alpha Vantage API",
            ),
            MarketDataProvider::Finnhub => (
                "finnhub_quote",
                "Get a real-time stock quote from the Finnhub API",
            ),
            MarketDataProvider::Yahoo => return None,
        };
        Some(Self {
            name,
            description,
            source,
        })
    }
}

#[async_trait]
impl Tool for ProviderQuoteTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        let provider = self.source.name();
        debug!(tool = self.name, symbol = %symbol, "Provider quote");

        match self.source.quote(&symbol).await {
            Ok(quote) => Ok(json!(format!("{provider} - {symbol}: ${:.2}", quote.price))),
            Err(e) if is_missing_data(&e) => {
                Ok(json!(format!("No data found for {symbol} via {provider}")))
            }
            Err(e) => Err(AgentError::ProcessingFailed(format!(
                "Error with {provider} API: {e}"
            ))),
        }
    }

    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "symbol": schema::string("Stock symbol (e.g., AAPL, MSFT, GOOGL)") }),
            vec!["symbol"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockMarketDataSource, Quote};
    use crate::error::StockError;
    use chrono::Utc;

    fn alpha_vantage(mock: MockMarketDataSource) -> ProviderQuoteTool {
        ProviderQuoteTool::for_provider(MarketDataProvider::AlphaVantage, Arc::new(mock)).unwrap()
    }

    #[test]
    fn test_no_tool_for_yahoo() {
        let tool = ProviderQuoteTool::for_provider(
            MarketDataProvider::Yahoo,
            Arc::new(MockMarketDataSource::new()),
        );
        assert!(tool.is_none());
    }

    #[tokio::test]
    async fn test_quote_output() {
        let mut mock = MockMarketDataSource::new();
        mock.expect_name().return_const("Alpha Vantage".to_string());
        mock.expect_quote().returning(|s| {
            Ok(Quote {
                symbol: s.to_string(),
                price: 412.3,
                timestamp: Utc::now(),
                source: "Alpha Vantage".into(),
            })
        });

        let tool = alpha_vantage(mock);
        assert_eq!(tool.name(), "alpha_vantage_quote");
        let out = tool.execute(json!({"symbol": "msft"})).await.unwrap();
        assert_eq!(out, json!("Alpha Vantage - MSFT: $412.30"));
    }

    #[tokio::test]
    async fn test_quote_rate_limited() {
        let mut mock = MockMarketDataSource::new();
        mock.expect_name().return_const("Alpha Vantage".to_string());
        mock.expect_quote().returning(|_| {
            Err(StockError::RateLimitExceeded {
                provider: "Alpha Vantage".into(),
            })
        });

        let err = alpha_vantage(mock)
            .execute(json!({"symbol": "AAPL"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Error with Alpha Vantage API"));
    }
}
