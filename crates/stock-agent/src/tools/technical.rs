//! `analyze_stock`: moving averages, trend, volatility and recent levels

use super::analysis::technical_snapshot;
use super::{SymbolParams, is_missing_data, normalize_symbol, parse_params};
use crate::api::{MarketDataSource, Period};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use stock_agent_core::{Error as AgentError, Result as AgentResult};
use stock_agent_llm::tools::schema;
use stock_agent_tools::Tool;
use tracing::debug;

/// Window the analysis is computed over
const ANALYSIS_PERIOD: Period = Period::ThreeMonths;

/// Basic technical analysis over the last three months
pub struct StockAnalysisTool {
    source: Arc<dyn MarketDataSource>,
}

impl StockAnalysisTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for StockAnalysisTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse_params(params)?;
        let symbol = normalize_symbol(&params.symbol)?;
        debug!(symbol = %symbol, "analyze_stock");

        let failed = |e: &dyn std::fmt::Display| {
            AgentError::ProcessingFailed(format!("Error analyzing stock {symbol}: {e}"))
        };

        let bars = match self.source.history(&symbol, ANALYSIS_PERIOD).await {
            Ok(bars) => bars,
            Err(e) if is_missing_data(&e) => Vec::new(),
            Err(e) => return Err(failed(&e)),
        };

        let snapshot = technical_snapshot(&bars).map_err(|e| failed(&e))?;
        Ok(json!(match snapshot {
            Some(snapshot) => snapshot.render(&symbol),
            None => format!("No data available for analysis of {symbol}"),
        }))
    }

    fn name(&self) -> &str {
        "analyze_stock"
    }

    fn description(&self) -> &str {
        "Perform basic technical analysis on a stock"
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "symbol": schema::string("Stock symbol to analyze") }),
            vec!["symbol"],
        )
    }
}
