//! Master agent: comprehensive and strategic analysis

use super::{AgentResponse, AgentRole, RoleAgent};
use crate::config::StockConfig;
use stock_agent_runtime::AgentRuntime;
use stock_agent_utils::Settings;

/// Default horizon for [`MasterAgent::market_outlook`]
pub const DEFAULT_OUTLOOK_TIMEFRAME: &str = "3-6 months";

/// Strategic insights, risk assessment and recommendations
pub struct MasterAgent {
    inner: RoleAgent,
}

impl MasterAgent {
    pub fn new(runtime: &AgentRuntime, settings: &Settings, config: &StockConfig) -> Self {
        Self {
            inner: RoleAgent::new(runtime, AgentRole::Master, settings, config),
        }
    }

    pub fn agent(&self) -> &RoleAgent {
        &self.inner
    }

    pub async fn run(&self, input: impl Into<String>) -> AgentResponse {
        self.inner.run(input).await
    }

    pub async fn comprehensive_analysis(&self, symbol: &str) -> AgentResponse {
        self.run(format!(
            "Perform a comprehensive analysis of {symbol} including fundamental analysis, technical analysis, strategic insights, and risk assessment"
        ))
        .await
    }

    pub async fn sector_analysis(&self, sector: &str) -> AgentResponse {
        self.run(format!(
            "Provide a comprehensive analysis of the {sector} sector, including key trends, leading companies, and investment opportunities"
        ))
        .await
    }

    pub async fn portfolio_recommendation(&self, symbols: &[String]) -> AgentResponse {
        self.run(format!(
            "Analyze this portfolio of stocks: {}. Provide diversification analysis, risk assessment, and strategic recommendations",
            symbols.join(", ")
        ))
        .await
    }

    /// `timeframe` such as [`DEFAULT_OUTLOOK_TIMEFRAME`]
    pub async fn market_outlook(&self, timeframe: &str) -> AgentResponse {
        self.run(format!(
            "Provide a comprehensive market outlook for the next {timeframe}, including key trends, risks, and opportunities across different sectors"
        ))
        .await
    }

    pub async fn risk_assessment(&self, symbol: &str) -> AgentResponse {
        self.run(format!(
            "Perform a detailed risk assessment for {symbol}, including market risks, company-specific risks, and risk mitigation strategies"
        ))
        .await
    }

    pub async fn investment_thesis(&self, symbol: &str) -> AgentResponse {
        self.run(format!(
            "Develop a comprehensive investment thesis for {symbol}, including the main investment argument, key catalysts, and potential outcomes"
        ))
        .await
    }

    pub async fn comparative_analysis(&self, symbols: &[String]) -> AgentResponse {
        self.run(format!(
            "Perform a detailed comparative analysis of {}, including relative valuation, growth prospects, and investment recommendations",
            symbols.join(", ")
        ))
        .await
    }

    pub fn capabilities(&self) -> &'static [&'static str] {
        AgentRole::Master.capabilities()
    }
}
