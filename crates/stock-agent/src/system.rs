//! The assembled system: market data, tools, agents and session history

use crate::agents::{
    AgentResponse, AgentRole, AgentStatus, JuniorAgent, MasterAgent, OrchestratorAgent,
    WorkflowRecord,
};
use crate::api::MarketData;
use crate::config::StockConfig;
use crate::error::Result;
use crate::tools::register_stock_tools;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use stock_agent_llm::LLMProvider;
use stock_agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use stock_agent_runtime::AgentRuntime;
use stock_agent_tools::ToolRegistry;
use stock_agent_utils::{ConfigError, MarketDataProvider, Settings};
use tokio::sync::RwLock;
use tracing::info;

/// Query used by [`StockAgentSystem::test_system`]
pub const TEST_QUERY: &str = "Get the current stock price for AAPL";

/// One analyzed query
#[derive(Debug, Clone, Serialize)]
pub struct SessionEntry {
    pub query: String,
    pub result: AgentResponse,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot for the `status` command
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub initialized: bool,
    pub model: String,
    pub verbose: bool,
    pub max_iterations: usize,
    pub market_data: String,
    pub agents: AgentStatus,
    pub tools: usize,
    pub session_history_length: usize,
}

/// Capabilities per agent
#[derive(Debug, Clone, Serialize)]
pub struct AgentCapabilities {
    pub orchestrator: &'static [&'static str],
    pub junior: &'static [&'static str],
    pub master: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Result of [`StockAgentSystem::test_system`]
#[derive(Debug, Clone, Serialize)]
pub struct SystemTestReport {
    pub test_query: &'static str,
    pub result: AgentResponse,
    pub system_working: bool,
}

/// Entry point for stock analysis queries
///
/// ```no_run
/// # async fn demo() -> stock_agent::Result<()> {
/// use stock_agent::StockAgentSystem;
/// use stock_agent_utils::Settings;
///
/// let system = StockAgentSystem::new(Settings::load()?)?;
/// let response = system.get_stock_price("AAPL").await;
/// println!("{}", response.output);
/// # Ok(())
/// # }
/// ```
pub struct StockAgentSystem {
    settings: Settings,
    tools: Arc<ToolRegistry>,
    market: Arc<MarketData>,
    orchestrator: OrchestratorAgent,
    session: RwLock<Vec<SessionEntry>>,
}

impl StockAgentSystem {
    /// Validate `settings` and connect to OpenAI and the market data providers
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_config(settings, StockConfig::default())
    }

    pub fn with_config(settings: Settings, config: StockConfig) -> Result<Self> {
        settings.validate()?;
        config.validate()?;

        let api_key = settings
            .openai_api_key
            .clone()
            .ok_or(ConfigError::MissingRequired {
                key: stock_agent_utils::config::keys::OPENAI_API_KEY,
            })?;
        let provider = OpenAIProvider::with_config(
            OpenAIConfig::new(api_key).with_api_base(settings.openai_api_base.clone()),
        )?;
        let market = Arc::new(MarketData::from_settings(&settings, &config)?);

        Ok(Self::with_components(settings, config, Arc::new(provider), market))
    }

    /// Assemble from an existing provider and market data source
    pub fn with_components(
        settings: Settings,
        config: StockConfig,
        provider: Arc<dyn LLMProvider>,
        market: Arc<MarketData>,
    ) -> Self {
        let tools = Arc::new(ToolRegistry::new());
        register_stock_tools(&tools, &market, settings.market_data_provider());

        let runtime = AgentRuntime::new(provider, Arc::clone(&tools));
        let junior = Arc::new(JuniorAgent::new(&runtime, &settings, &config));
        let master = Arc::new(MasterAgent::new(&runtime, &settings, &config));
        let orchestrator = OrchestratorAgent::new(&runtime, &settings, &config, junior, master);

        info!(
            model = %settings.openai_model,
            market_data = %settings.market_data_provider(),
            tools = tools.len(),
            "Stock agent system initialized"
        );

        Self {
            settings,
            tools,
            market,
            orchestrator,
            session: RwLock::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn orchestrator(&self) -> &OrchestratorAgent {
        &self.orchestrator
    }

    pub fn junior(&self) -> &JuniorAgent {
        self.orchestrator.junior()
    }

    pub fn master(&self) -> &MasterAgent {
        self.orchestrator.master()
    }

    pub fn market_data(&self) -> &Arc<MarketData> {
        &self.market
    }

    /// Route any stock question through the orchestrator and log it in the session
    pub async fn analyze_query(&self, query: &str) -> AgentResponse {
        let result = self.orchestrator.orchestrate(query).await;
        self.session.write().await.push(SessionEntry {
            query: query.to_string(),
            result: result.clone(),
            timestamp: Utc::now(),
        });
        result
    }

    pub async fn get_stock_price(&self, symbol: &str) -> AgentResponse {
        self.analyze_query(&format!("Get the current stock price for {symbol}"))
            .await
    }

    pub async fn get_stock_info(&self, symbol: &str) -> AgentResponse {
        self.analyze_query(&format!("Get detailed information about {symbol}"))
            .await
    }

    pub async fn analyze_stock(&self, symbol: &str) -> AgentResponse {
        self.analyze_query(&format!("Perform comprehensive analysis of {symbol}"))
            .await
    }

    pub async fn compare_stocks(&self, symbols: &[String]) -> AgentResponse {
        self.analyze_query(&format!("Compare these stocks: {}", symbols.join(", ")))
            .await
    }

    pub async fn portfolio_analysis(&self, symbols: &[String]) -> AgentResponse {
        self.analyze_query(&format!("Analyze this portfolio: {}", symbols.join(", ")))
            .await
    }

    pub async fn market_research(&self, topic: &str) -> AgentResponse {
        self.analyze_query(&format!("Research the market for: {topic}"))
            .await
    }

    pub async fn system_status(&self) -> SystemStatus {
        SystemStatus {
            initialized: true,
            model: self.settings.openai_model.clone(),
            verbose: self.settings.verbose,
            max_iterations: self.settings.max_iterations,
            market_data: self.settings.market_data_provider().to_string(),
            agents: self.orchestrator.agent_status().await,
            tools: self.tools.len(),
            session_history_length: self.session.read().await.len(),
        }
    }

    pub async fn session_history(&self) -> Vec<SessionEntry> {
        self.session.read().await.clone()
    }

    /// Clears the session log, the workflow history and agent memory
    pub async fn clear_session_history(&self) {
        self.session.write().await.clear();
        self.orchestrator.clear_workflow_history().await;
        self.orchestrator.clear_memory().await;
    }

    pub async fn workflow_history(&self) -> Vec<WorkflowRecord> {
        self.orchestrator.workflow_history().await
    }

    pub fn agent_capabilities(&self) -> AgentCapabilities {
        AgentCapabilities {
            orchestrator: AgentRole::Orchestrator.capabilities(),
            junior: self.junior().capabilities(),
            master: self.master().capabilities(),
        }
    }

    pub fn available_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .descriptions()
            .into_iter()
            .map(|(name, description)| ToolInfo { name, description })
            .collect()
    }

    /// Whether a keyed market data provider is configured
    pub fn has_keyed_market_data(&self) -> bool {
        self.settings.market_data_provider() != MarketDataProvider::Yahoo
    }

    /// Run [`TEST_QUERY`] end to end
    pub async fn test_system(&self) -> SystemTestReport {
        let result = self.analyze_query(TEST_QUERY).await;
        SystemTestReport {
            test_query: TEST_QUERY,
            system_working: result.success,
            result,
        }
    }
}

impl fmt::Display for StockAgentSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StockAgentSystem(initialized=true, agents=3, tools={})",
            self.tools.len()
        )
    }
}

impl fmt::Debug for StockAgentSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
