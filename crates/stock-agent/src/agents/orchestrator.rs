//! Orchestrator: routes queries by complexity and synthesizes results

use super::{AgentResponse, AgentRole, JuniorAgent, MasterAgent, RoleAgent};
use crate::config::StockConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use stock_agent_core::{Agent, Context, Error, Result};
use stock_agent_runtime::AgentRuntime;
use stock_agent_utils::Settings;
use tokio::sync::RwLock;
use tracing::{debug, info};

const SIMPLE_KEYWORDS: &[&str] = &[
    "price",
    "current price",
    "stock price",
    "basic info",
    "company info",
    "simple",
    "quick",
    "basic",
];

const COMPLEX_KEYWORDS: &[&str] = &[
    "analysis",
    "comprehensive",
    "strategic",
    "recommendation",
    "investment thesis",
    "risk assessment",
    "portfolio",
    "sector",
    "market outlook",
    "comparative",
    "detailed",
];

const JUNIOR_PREFIX: &str = "🤖 JUNIOR AGENT ANALYSIS:\n\n";
const MASTER_PREFIX: &str = "🎯 MASTER AGENT ANALYSIS:\n\n";

const FALLBACK_TAKEAWAYS: &str = "Based on the comprehensive analysis above, here are the key takeaways:\n\
- Data accuracy verified by Junior Agent\n\
- Strategic insights provided by Master Agent\n\
- Combined analysis provides balanced perspective";

const IMPORTANT_NOTES: &str = "⚠️ IMPORTANT NOTES:\n\
- This analysis is for informational purposes only\n\
- Always conduct your own research before making investment decisions\n\
- Consider consulting with financial professionals\n\
- Past performance does not guarantee future results";

/// Routing class of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// Junior agent only
    Simple,
    /// Master agent only
    Complex,
    /// Both agents, then synthesis
    MultiStep,
}

impl Complexity {
    pub fn as_str(self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Complex => "complex",
            Complexity::MultiStep => "multi_step",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a query by counting simple and complex keywords
///
/// Keywords are substring matches on the lower-cased query, so "stock price"
/// also counts as "price".
pub fn assess_complexity(query: &str) -> Complexity {
    let query = query.to_lowercase();
    let count = |keywords: &[&str]| keywords.iter().filter(|k| query.contains(*k)).count();
    let simple = count(SIMPLE_KEYWORDS);
    let complex = count(COMPLEX_KEYWORDS);

    if complex > simple {
        Complexity::Complex
    } else if simple > 0 && complex == 0 {
        Complexity::Simple
    } else {
        Complexity::MultiStep
    }
}

/// One orchestrated query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub complexity: Complexity,
    pub agents: Vec<String>,
    pub success: bool,
    pub duration_ms: u64,
}

/// Configuration snapshot of one agent
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub name: &'static str,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_iterations: usize,
    pub tools: usize,
    /// Conversation memory is always on
    pub memory: bool,
    pub remembered_messages: usize,
}

impl AgentInfo {
    async fn of(agent: &RoleAgent) -> Self {
        let config = agent.executor_config();
        Self {
            name: agent.role().name(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_iterations: config.max_iterations,
            tools: agent.tool_count(),
            memory: true,
            remembered_messages: agent.memory_len().await,
        }
    }
}

/// Status of the orchestrator and its sub-agents
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub orchestrator: AgentInfo,
    pub junior: AgentInfo,
    pub master: AgentInfo,
    pub workflows: usize,
}

/// Coordinates the Junior and Master agents
pub struct OrchestratorAgent {
    inner: RoleAgent,
    junior: Arc<JuniorAgent>,
    master: Arc<MasterAgent>,
    history: RwLock<Vec<WorkflowRecord>>,
}

impl OrchestratorAgent {
    pub fn new(
        runtime: &AgentRuntime,
        settings: &Settings,
        config: &StockConfig,
        junior: Arc<JuniorAgent>,
        master: Arc<MasterAgent>,
    ) -> Self {
        Self {
            inner: RoleAgent::new(runtime, AgentRole::Orchestrator, settings, config),
            junior,
            master,
            history: RwLock::new(Vec::new()),
        }
    }

    pub fn junior(&self) -> &Arc<JuniorAgent> {
        &self.junior
    }

    pub fn master(&self) -> &Arc<MasterAgent> {
        &self.master
    }

    /// Route `query` and record the workflow
    pub async fn orchestrate(&self, query: &str) -> AgentResponse {
        let mut context = Context::new();
        self.orchestrate_with_context(query, &mut context).await
    }

    async fn orchestrate_with_context(&self, query: &str, context: &mut Context) -> AgentResponse {
        let started = Instant::now();
        let complexity = assess_complexity(query);
        info!(complexity = %complexity, "Orchestrating query");
        context.insert(
            stock_agent_core::context::keys::COMPLEXITY,
            serde_json::json!(complexity.as_str()),
        );

        let response = match complexity {
            Complexity::Simple => self.handle_single(AgentRole::Junior, query).await,
            Complexity::Complex => self.handle_single(AgentRole::Master, query).await,
            Complexity::MultiStep => self.handle_multi_step(query).await,
        };
        context.set_routed_agent(&response.sub_agents.join(","));

        let record = WorkflowRecord {
            timestamp: Utc::now(),
            query: query.to_string(),
            complexity,
            agents: response.sub_agents.clone(),
            success: response.success,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        self.history.write().await.push(record);

        response
    }

    async fn handle_single(&self, role: AgentRole, query: &str) -> AgentResponse {
        let (result, prefix) = match role {
            AgentRole::Master => (self.master.run(query).await, MASTER_PREFIX),
            _ => (self.junior.run(query).await, JUNIOR_PREFIX),
        };

        AgentResponse {
            agent: AgentRole::Orchestrator.name().to_string(),
            input: query.to_string(),
            output: format!("{prefix}{}", result.output),
            success: result.success,
            sub_agents: vec![role.name().to_string()],
            error: result.error,
        }
    }

    async fn handle_multi_step(&self, query: &str) -> AgentResponse {
        let (junior, master) = tokio::join!(self.junior.run(query), self.master.run(query));
        let output = self.synthesize(query, &junior, &master).await;

        let error = match (&junior.error, &master.error) {
            (Some(j), Some(m)) => Some(format!("Junior: {j}; Master: {m}")),
            (Some(j), None) => Some(format!("Junior: {j}")),
            (None, Some(m)) => Some(format!("Master: {m}")),
            (None, None) => None,
        };

        AgentResponse {
            agent: AgentRole::Orchestrator.name().to_string(),
            input: query.to_string(),
            output,
            success: junior.success && master.success,
            sub_agents: vec![
                AgentRole::Junior.name().to_string(),
                AgentRole::Master.name().to_string(),
            ],
            error,
        }
    }

    async fn synthesize(&self, query: &str, junior: &AgentResponse, master: &AgentResponse) -> String {
        let mut out = format!("🤖 ORCHESTRATED ANALYSIS: {query}\n\n");

        if junior.success {
            out.push_str(&format!("📊 DATA GATHERING (Junior Agent):\n{}\n\n", junior.output));
        }
        if master.success {
            out.push_str(&format!("🎯 ADVANCED ANALYSIS (Master Agent):\n{}\n\n", master.output));
        }

        out.push_str("📋 SYNTHESIS & RECOMMENDATIONS:\n");
        out.push_str(&self.takeaways(query, junior, master).await);
        out.push_str("\n\n");
        out.push_str(IMPORTANT_NOTES);
        out
    }

    /// Synthesis written by the orchestrator's model, or the fixed lines
    async fn takeaways(&self, query: &str, junior: &AgentResponse, master: &AgentResponse) -> String {
        if !junior.success && !master.success {
            return FALLBACK_TAKEAWAYS.to_string();
        }

        let section = |r: &AgentResponse| {
            if r.success {
                r.output.clone()
            } else {
                "(no result)".to_string()
            }
        };
        let prompt = format!(
            "User request: {query}\n\n\
             Junior Agent findings:\n{}\n\n\
             Master Agent findings:\n{}\n\n\
             Write the synthesis and recommendations section: three to five concise takeaways \
             combining both findings. Do not repeat the findings verbatim.",
            section(junior),
            section(master),
        );

        let synthesis = self.inner.run(prompt).await;
        if synthesis.success && !synthesis.output.trim().is_empty() {
            synthesis.output
        } else {
            debug!("Synthesis unavailable, using fixed takeaways");
            FALLBACK_TAKEAWAYS.to_string()
        }
    }

    pub async fn get_stock_price(&self, symbol: &str) -> AgentResponse {
        self.orchestrate(&format!("Get the current stock price for {symbol}"))
            .await
    }

    pub async fn comprehensive_analysis(&self, symbol: &str) -> AgentResponse {
        self.orchestrate(&format!("Perform comprehensive analysis of {symbol}"))
            .await
    }

    pub async fn portfolio_analysis(&self, symbols: &[String]) -> AgentResponse {
        self.orchestrate(&format!("Analyze this portfolio: {}", symbols.join(", ")))
            .await
    }

    pub async fn market_research(&self, query: &str) -> AgentResponse {
        self.orchestrate(query).await
    }

    /// Every orchestrated query so far, oldest first
    pub async fn workflow_history(&self) -> Vec<WorkflowRecord> {
        self.history.read().await.clone()
    }

    pub async fn clear_workflow_history(&self) {
        self.history.write().await.clear();
    }

    /// Forget the conversations of all three agents
    pub async fn clear_memory(&self) {
        tokio::join!(
            self.inner.clear_memory(),
            self.junior.agent().clear_memory(),
            self.master.agent().clear_memory(),
        );
    }

    pub async fn agent_status(&self) -> AgentStatus {
        AgentStatus {
            orchestrator: AgentInfo::of(&self.inner).await,
            junior: AgentInfo::of(self.junior.agent()).await,
            master: AgentInfo::of(self.master.agent()).await,
            workflows: self.history.read().await.len(),
        }
    }

    pub fn capabilities(&self) -> &'static [&'static str] {
        AgentRole::Orchestrator.capabilities()
    }
}

#[async_trait]
impl Agent for OrchestratorAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        let response = self.orchestrate_with_context(&input, context).await;
        if response.success {
            Ok(response.output)
        } else {
            Err(Error::ProcessingFailed(
                response.error.unwrap_or(response.output),
            ))
        }
    }

    fn name(&self) -> &str {
        AgentRole::Orchestrator.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::base::tests::{runtime, settings};
    use crate::test_support::RoleProvider;

    fn orchestrator(provider: &Arc<RoleProvider>) -> OrchestratorAgent {
        let runtime = runtime(Arc::clone(provider));
        let settings = settings();
        let config = StockConfig::default();
        let junior = Arc::new(JuniorAgent::new(&runtime, &settings, &config));
        let master = Arc::new(MasterAgent::new(&runtime, &settings, &config));
        OrchestratorAgent::new(&runtime, &settings, &config, junior, master)
    }

    #[test]
    fn test_assess_complexity() {
        assert_eq!(assess_complexity("Get the current stock price for AAPL"), Complexity::Simple);
        assert_eq!(assess_complexity("quick basic info on MSFT"), Complexity::Simple);
        assert_eq!(
            assess_complexity("Perform comprehensive analysis of TSLA"),
            Complexity::Complex
        );
        assert_eq!(
            assess_complexity("Give me a detailed risk assessment for my portfolio"),
            Complexity::Complex
        );
        // no keywords at all
        assert_eq!(assess_complexity("Tell me about NVDA"), Complexity::MultiStep);
        // one of each
        assert_eq!(
            assess_complexity("Price and sector of AMD"),
            Complexity::MultiStep
        );
        assert_eq!(
            assess_complexity("Compare these stocks: AAPL, MSFT, GOOGL"),
            Complexity::MultiStep
        );
    }

    #[test]
    fn test_keyword_counts_overlap() {
        // "stock price", "price" and "analysis" => simple 2, complex 1
        assert_eq!(
            assess_complexity("stock price analysis"),
            Complexity::MultiStep
        );
    }

    #[tokio::test]
    async fn test_simple_routes_to_junior_only() {
        let provider = Arc::new(RoleProvider::new());
        let orchestrator = orchestrator(&provider);

        let response = orchestrator.get_stock_price("AAPL").await;
        assert!(response.success);
        assert_eq!(response.agent, "Orchestrator");
        assert_eq!(response.sub_agents, vec!["Junior"]);
        assert_eq!(response.output, "🤖 JUNIOR AGENT ANALYSIS:\n\nJunior report");
        assert_eq!(provider.roles_seen(), vec!["Junior"]);
    }

    #[tokio::test]
    async fn test_complex_routes_to_master_only() {
        let provider = Arc::new(RoleProvider::new());
        let orchestrator = orchestrator(&provider);

        let response = orchestrator.comprehensive_analysis("TSLA").await;
        assert!(response.success);
        assert_eq!(response.sub_agents, vec!["Master"]);
        assert!(response.output.starts_with("🎯 MASTER AGENT ANALYSIS:\n\n"));
        assert_eq!(provider.roles_seen(), vec!["Master"]);
    }

    #[tokio::test]
    async fn test_multi_step_synthesis() {
        let provider = Arc::new(RoleProvider::new());
        let orchestrator = orchestrator(&provider);

        let response = orchestrator.market_research("Tell me about NVDA").await;
        assert!(response.success);
        assert_eq!(response.sub_agents, vec!["Junior", "Master"]);

        let out = &response.output;
        assert!(out.starts_with("🤖 ORCHESTRATED ANALYSIS: Tell me about NVDA\n\n"));
        assert!(out.contains("📊 DATA GATHERING (Junior Agent):\nJunior report\n\n"));
        assert!(out.contains("🎯 ADVANCED ANALYSIS (Master Agent):\nMaster report\n\n"));
        assert!(out.contains("📋 SYNTHESIS & RECOMMENDATIONS:\nOrchestrator report\n\n"));
        assert!(out.ends_with("- Past performance does not guarantee future results"));

        let mut roles = provider.roles_seen();
        assert_eq!(roles.pop(), Some("Orchestrator"));
        roles.sort_unstable();
        assert_eq!(roles, vec!["Junior", "Master"]);
    }

    #[tokio::test]
    async fn test_multi_step_partial_failure() {
        let provider = Arc::new(RoleProvider::failing(&["Master", "Orchestrator"]));
        let orchestrator = orchestrator(&provider);

        let response = orchestrator.market_research("Tell me about NVDA").await;
        assert!(!response.success);
        assert!(response.output.contains("📊 DATA GATHERING (Junior Agent):"));
        assert!(!response.output.contains("ADVANCED ANALYSIS"));
        assert!(response.output.contains("- Data accuracy verified by Junior Agent\n"));
        assert!(response.error.as_deref().unwrap().starts_with("Master: "));
    }

    #[tokio::test]
    async fn test_multi_step_total_failure_skips_synthesis_call() {
        let provider = Arc::new(RoleProvider::failing(&["Junior", "Master"]));
        let orchestrator = orchestrator(&provider);

        let response = orchestrator.market_research("Tell me about NVDA").await;
        assert!(!response.success);
        assert!(!provider.roles_seen().contains(&"Orchestrator"));
        assert!(response.output.contains(FALLBACK_TAKEAWAYS));
    }

    #[tokio::test]
    async fn test_workflow_history_and_status() {
        let provider = Arc::new(RoleProvider::new());
        let orchestrator = orchestrator(&provider);

        orchestrator.get_stock_price("AAPL").await;
        orchestrator
            .portfolio_analysis(&["AAPL".to_string(), "JNJ".to_string()])
            .await;

        let history = orchestrator.workflow_history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].complexity, Complexity::Simple);
        assert_eq!(history[1].complexity, Complexity::Complex);
        assert_eq!(history[1].query, "Analyze this portfolio: AAPL, JNJ");

        let status = orchestrator.agent_status().await;
        assert_eq!(status.workflows, 2);
        assert_eq!(status.junior.temperature, Some(0.5));
        assert_eq!(status.orchestrator.temperature, Some(0.3));
        assert_eq!(status.master.max_iterations, 4);
        assert!(status.junior.memory);
        assert_eq!(status.junior.remembered_messages, 2);
        assert_eq!(status.master.remembered_messages, 2);

        orchestrator.clear_workflow_history().await;
        assert!(orchestrator.workflow_history().await.is_empty());

        orchestrator.clear_memory().await;
        let status = orchestrator.agent_status().await;
        assert_eq!(status.junior.remembered_messages, 0);
        assert_eq!(status.master.remembered_messages, 0);
    }

    #[tokio::test]
    async fn test_agent_trait_records_routing() {
        let provider = Arc::new(RoleProvider::failing(&["Master"]));
        let orchestrator = orchestrator(&provider);
        let mut context = Context::new();

        let err = orchestrator
            .process("Perform comprehensive analysis of TSLA".to_string(), &mut context)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Master unavailable"));
        assert_eq!(context.routed_agent(), Some("Master"));
        assert_eq!(context.get("complexity"), Some(&serde_json::json!("complex")));
    }
}
