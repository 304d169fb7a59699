//! AI stock analysis agent system
//!
//! Three LLM agents share one set of market data tools:
//!
//! - [`JuniorAgent`]: prices, company information, history and basic
//!   technical analysis
//! - [`MasterAgent`]: comprehensive analysis, risk assessment, portfolio and
//!   sector insights
//! - [`OrchestratorAgent`]: classifies each query as simple, complex or
//!   multi-step, routes it, and synthesizes results when both agents run
//!
//! Market data comes from Alpha Vantage or Finnhub when a key is configured,
//! with Yahoo Finance as the keyless fallback. [`StockAgentSystem`] wires
//! everything together from the environment [`Settings`](stock_agent_utils::Settings).
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_agent::StockAgentSystem;
//! use stock_agent_utils::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let system = StockAgentSystem::new(Settings::load()?)?;
//!
//!     let response = system.analyze_query("Compare AAPL, MSFT and GOOGL").await;
//!     println!("{}", response.output);
//!
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod system;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;

pub use agents::{
    AgentResponse, AgentRole, Complexity, JuniorAgent, MasterAgent, OrchestratorAgent,
    assess_complexity,
};
pub use api::{MarketData, MarketDataSource, Period};
pub use config::StockConfig;
pub use error::{Result, StockError};
pub use system::StockAgentSystem;
