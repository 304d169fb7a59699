//! Price, company information and history tools

use super::analysis::{render_profile, summarize_history};
use super::{SymbolParams, is_missing_data, normalize_symbol, parse_params};
use crate::api::{MarketDataSource, Period};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use stock_agent_core::{Error as AgentError, Result as AgentResult};
use stock_agent_llm::tools::schema;
use stock_agent_tools::Tool;
use tracing::debug;

const SYMBOL_DESCRIPTION: &str = "Stock symbol (e.g., AAPL, MSFT, GOOGL)";

fn symbol_schema(description: &str) -> Value {
    schema::object(
        json!({ "symbol": schema::string(description) }),
        vec!["symbol"],
    )
}

/// `get_stock_price`
pub struct StockPriceTool {
    source: Arc<dyn MarketDataSource>,
}

impl StockPriceTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        debug!(symbol = %symbol, "get_stock_price");

        match self.source.quote(&symbol).await {
            Ok(quote) if quote.price > 0.0 => Ok(json!(format!(
                "Current price of {symbol}: ${:.2}",
                quote.price
            ))),
            Ok(_) => Ok(json!(format!("Could not retrieve price for {symbol}"))),
            Err(e) if is_missing_data(&e) => {
                Ok(json!(format!("Could not retrieve price for {symbol}")))
            }
            Err(e) => Err(AgentError::ProcessingFailed(format!(
                "Error getting stock price for {symbol}: {e}"
            ))),
        }
    }

    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Get the current stock price for a given symbol"
    }

    fn input_schema(&self) -> Value {
        symbol_schema(SYMBOL_DESCRIPTION)
    }
}

/// `get_stock_info`
pub struct StockInfoTool {
    source: Arc<dyn MarketDataSource>,
}

impl StockInfoTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for StockInfoTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        debug!(symbol = %symbol, "get_stock_info");

        let profile = self.source.profile(&symbol).await.map_err(|e| {
            AgentError::ProcessingFailed(format!("Error getting stock info for {symbol}: {e}"))
        })?;
        Ok(json!(render_profile(&symbol, &profile)))
    }

    fn name(&self) -> &str {
        "get_stock_info"
    }

    fn description(&self) -> &str {
        "Get detailed information about a stock including company name, sector, market cap, etc."
    }

    fn input_schema(&self) -> Value {
        symbol_schema("Stock symbol to get information about")
    }
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    symbol: String,
    #[serde(default)]
    period: Option<String>,
}

/// `get_stock_history`
pub struct StockHistoryTool {
    source: Arc<dyn MarketDataSource>,
}

impl StockHistoryTool {
    /// Period used when the model leaves it out
    pub const DEFAULT_PERIOD: Period = Period::OneMonth;

    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for StockHistoryTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: HistoryParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        let period = match params.period.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw
                .parse::<Period>()
                .map_err(|e| AgentError::InvalidInput(e.to_string()))?,
            _ => Self::DEFAULT_PERIOD,
        };
        debug!(symbol = %symbol, period = %period, "get_stock_history");

        let bars = match self.source.history(&symbol, period).await {
            Ok(bars) => bars,
            Err(e) if is_missing_data(&e) => Vec::new(),
            Err(e) => {
                return Err(AgentError::ProcessingFailed(format!(
                    "Error getting stock history for {symbol}: {e}"
                )));
            }
        };

        Ok(json!(match summarize_history(&bars) {
            Some(summary) => summary.render(&symbol, period.as_str()),
            None => format!("No historical data found for {symbol}"),
        }))
    }

    fn name(&self) -> &str {
        "get_stock_history"
    }

    fn description(&self) -> &str {
        "Get historical stock data for analysis"
    }

    fn input_schema(&self) -> Value {
        let periods: Vec<&str> = Period::ALL.iter().map(|p| p.as_str()).collect();
        schema::object(
            json!({
                "symbol": schema::string("Stock symbol"),
                "period": schema::string_enum(
                    "Time period (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)",
                    &periods,
                ),
            }),
            vec!["symbol"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CompanyProfile, MockMarketDataSource, Quote};
    use crate::error::StockError;
    use crate::tools::analysis::tests::bars_from_closes;
    use chrono::Utc;

    fn quote(price: f64) -> Quote {
        Quote {
            symbol: "AAPL".into(),
            price,
            timestamp: Utc::now(),
            source: "Yahoo Finance".into(),
        }
    }

    #[tokio::test]
    async fn test_price_uppercases_symbol() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_quote()
            .withf(|s| s == "AAPL")
            .returning(|_| Ok(quote(189.984)));

        let tool = StockPriceTool::new(Arc::new(source));
        let out = tool.execute(json!({"symbol": "aapl"})).await.unwrap();
        assert_eq!(out, json!("Current price of AAPL: $189.98"));
    }

    #[tokio::test]
    async fn test_price_missing_data() {
        let mut source = MockMarketDataSource::new();
        source.expect_quote().returning(|s| {
            Err(StockError::DataUnavailable {
                symbol: s.to_string(),
                reason: "no quotes".into(),
            })
        });

        let tool = StockPriceTool::new(Arc::new(source));
        let out = tool.execute(json!({"symbol": "zzzz"})).await.unwrap();
        assert_eq!(out, json!("Could not retrieve price for ZZZZ"));
    }

    #[tokio::test]
    async fn test_price_provider_failure_is_tool_error() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_quote()
            .returning(|_| Err(StockError::YahooFinanceError("timeout".into())));

        let tool = StockPriceTool::new(Arc::new(source));
        let err = tool.execute(json!({"symbol": "AAPL"})).await.unwrap_err();
        assert!(err.to_string().contains("Error getting stock price for AAPL"));
    }

    #[tokio::test]
    async fn test_info_renders_profile() {
        let mut source = MockMarketDataSource::new();
        source.expect_profile().returning(|s| {
            Ok(CompanyProfile {
                symbol: s.to_string(),
                name: Some("Microsoft Corporation".into()),
                sector: Some("Technology".into()),
                ..CompanyProfile::default()
            })
        });

        let tool = StockInfoTool::new(Arc::new(source));
        let out = tool.execute(json!({"symbol": "msft"})).await.unwrap();
        let text = out.as_str().unwrap();
        assert!(text.starts_with("Information for MSFT:\n"));
        assert!(text.contains("Sector: Technology\n"));
        assert!(text.contains("Dividend Yield: N/A\n"));
    }

    #[tokio::test]
    async fn test_history_default_period() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_history()
            .withf(|s, p| s == "TSLA" && *p == Period::OneMonth)
            .returning(|_, _| Ok(bars_from_closes(&[200.0, 220.0])));

        let tool = StockHistoryTool::new(Arc::new(source));
        let out = tool.execute(json!({"symbol": "tsla"})).await.unwrap();
        let text = out.as_str().unwrap();
        assert!(text.starts_with("Historical data for TSLA (1mo):\n"));
        assert!(text.contains("Price Change: $20.00\n"));
        assert!(text.ends_with("Percent Change: 10.00%"));
    }

    #[tokio::test]
    async fn test_history_empty_and_invalid_period() {
        let mut source = MockMarketDataSource::new();
        source.expect_history().returning(|_, _| Ok(Vec::new()));
        let tool = StockHistoryTool::new(Arc::new(source));

        let out = tool
            .execute(json!({"symbol": "aapl", "period": "1y"}))
            .await
            .unwrap();
        assert_eq!(out, json!("No historical data found for AAPL"));

        let err = tool
            .execute(json!({"symbol": "aapl", "period": "2w"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidInput(_)));
    }

    #[test]
    fn test_history_schema_lists_periods() {
        let tool = StockHistoryTool::new(Arc::new(MockMarketDataSource::new()));
        let schema = tool.input_schema();
        assert_eq!(schema["required"], json!(["symbol"]));
        assert_eq!(schema["properties"]["period"]["enum"][2], "1mo");
    }
}
