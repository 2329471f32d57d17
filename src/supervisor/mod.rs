//! Supervisor: routes a query through the capability agents and
//! synthesizes one answer
//!
//! Each call runs `Received → Segmenting → Routing → Aggregating → Responded`.
//! The supervisor first tries with the full agent set, using a search
//! session scoped to the call. If that fails for any reason it reruns the
//! whole request with the reduced set (math validator and claim extractor).

mod prompt;
mod routing;

pub use routing::RoutingPlan;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::agents::capability::{
    CapabilityAgent, CapabilityToolPort, ClaimExtractor, EvidenceChecker, MathValidator,
};
use crate::agents::config::{AgentConfig, AgentLimits};
use crate::agents::core::ReActAgent;
use crate::agents::domain::{FactCheckResponse, StructuredResponse};
use crate::agents::llm::LlmProvider;
use crate::agents::tools::ToolPort;
use crate::config::Settings;
use crate::provider::ToolProviderConnector;

const SUPERVISOR: &str = "fact_check_supervisor";

const EMPTY_RESPONSE: &str = "I apologize, but I couldn't produce a fact-check assessment. \
Please try rephrasing your request.";

/// Stages of one supervisor run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Received,
    Segmenting,
    Routing,
    Aggregating,
    Responded,
}

impl std::fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SupervisorState::Received => "received",
            SupervisorState::Segmenting => "segmenting",
            SupervisorState::Routing => "routing",
            SupervisorState::Aggregating => "aggregating",
            SupervisorState::Responded => "responded",
        };
        f.write_str(s)
    }
}

/// Anything that can answer a fact-check request
#[async_trait]
pub trait FactCheckPort: Send + Sync {
    async fn fact_check(&self, query: &str) -> FactCheckResponse;
}

/// Orchestrates the capability agents
pub struct Supervisor {
    llm: Arc<dyn LlmProvider>,
    connector: Option<ToolProviderConnector>,
    agent_limits: AgentLimits,
    limits: AgentLimits,
}

impl Supervisor {
    /// Supervisor with default limits
    ///
    /// `connector` is `None` when external search is unavailable; every
    /// request then goes straight to the reduced agent set.
    pub fn new(llm: Arc<dyn LlmProvider>, connector: Option<ToolProviderConnector>) -> Self {
        let settings = Settings::default();
        Self {
            llm,
            connector,
            agent_limits: settings.agents,
            limits: settings.supervisor,
        }
    }

    /// Supervisor using the limits from settings
    pub fn from_settings(
        llm: Arc<dyn LlmProvider>,
        connector: Option<ToolProviderConnector>,
        settings: &Settings,
    ) -> Self {
        Self::new(llm, connector).with_limits(settings.agents, settings.supervisor)
    }

    /// Override limits for capability calls and for the supervisor run
    pub fn with_limits(mut self, agents: AgentLimits, supervisor: AgentLimits) -> Self {
        self.agent_limits = agents;
        self.limits = supervisor;
        self
    }

    /// Whether external search is configured
    pub fn has_search(&self) -> bool {
        self.connector.is_some()
    }

    /// Fact-check a query
    ///
    /// Never fails: if both the full and the reduced attempt fail, the error
    /// comes back as plain text starting with `Error`.
    pub async fn fact_check(&self, query: &str) -> FactCheckResponse {
        enter(SupervisorState::Received);
        let plan = RoutingPlan::from_query(query);
        debug!(numeric = plan.numeric, verification = plan.verification, "Routing plan");

        match &self.connector {
            Some(connector) => {
                let attempt = connector
                    .scoped(|search| async move {
                        let port = self.full_agents(search);
                        self.run(&port, query, &plan).await
                    })
                    .await;

                match attempt {
                    Ok(text) => return respond(text),
                    Err(e) => error!("Error processing query with search tools: {}", e),
                }
            }
            None => debug!("No search tool provider configured"),
        }

        info!("Using fallback mode without search tools");
        let port = self.reduced_agents();
        match self.run(&port, query, &plan).await {
            Ok(text) => respond(text),
            Err(e) => {
                error!("Fallback fact-check failed: {}", e);
                FactCheckResponse::PlainText(format!("Error processing fact-check request: {}", e))
            }
        }
    }

    fn full_agents(&self, search: Arc<dyn ToolPort>) -> CapabilityToolPort {
        let evidence =
            EvidenceChecker::new(self.llm.clone(), self.agent_limits).with_search(search);
        CapabilityToolPort::new(vec![
            Arc::new(MathValidator::new(self.llm.clone(), self.agent_limits)),
            Arc::new(ClaimExtractor::new(self.llm.clone(), self.agent_limits)),
            Arc::new(evidence),
        ])
    }

    fn reduced_agents(&self) -> CapabilityToolPort {
        CapabilityToolPort::new(vec![
            Arc::new(MathValidator::new(self.llm.clone(), self.agent_limits)),
            Arc::new(ClaimExtractor::new(self.llm.clone(), self.agent_limits)),
        ])
    }

    /// One complete pass of the state machine against a given agent set
    async fn run(
        &self,
        port: &CapabilityToolPort,
        query: &str,
        plan: &RoutingPlan,
    ) -> anyhow::Result<String> {
        enter(SupervisorState::Segmenting);
        let names = port.names();
        let config = AgentConfig::new(
            SUPERVISOR,
            "Coordinates the fact-checking agents",
            prompt::system_prompt(&port.descriptions()),
        )
        .with_agent_limits(self.limits);

        let tools: Arc<dyn ToolPort> = Arc::new(port.clone());
        let supervisor = ReActAgent::new(config, self.llm.clone()).with_tools(tools);

        enter(SupervisorState::Routing);
        let guidance = plan.guidance(&names);
        let response = supervisor
            .run(&prompt::user_prompt(query, guidance.as_deref()))
            .await?;
        info!(
            iterations = response.iterations,
            agents_called = response.tool_calls.len(),
            "Supervisor finished routing"
        );

        enter(SupervisorState::Aggregating);
        let mut findings: Vec<(&str, String)> = Vec::new();
        for name in plan.required() {
            if response.called_tool(name) {
                continue;
            }
            let Some(agent) = port.agent(name) else {
                continue;
            };
            warn!(agent = name, "Required capability was not consulted; invoking directly");
            findings.push((name, agent.invoke(query).await));
        }

        let text = if findings.is_empty() {
            response.content
        } else {
            self.aggregate(query, &response.content, &findings).await
        };

        enter(SupervisorState::Responded);
        Ok(text)
    }

    /// Fold extra findings into the draft answer
    async fn aggregate(&self, query: &str, draft: &str, findings: &[(&str, String)]) -> String {
        let config = AgentConfig::new(
            "fact_check_editor",
            "Merges specialist findings into an assessment",
            prompt::AGGREGATION_SYSTEM_PROMPT,
        )
        .with_agent_limits(self.agent_limits);
        let editor = ReActAgent::new(config, self.llm.clone());

        match editor.run(&prompt::aggregation_prompt(query, draft, findings)).await {
            Ok(response) if !response.content.trim().is_empty() => return response.content,
            Ok(_) => warn!("Aggregation produced no output; appending findings to the draft"),
            Err(e) => warn!(error = %e, "Aggregation failed; appending findings to the draft"),
        }

        let mut text = draft.trim().to_string();
        for (_, output) in findings {
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            text.push_str(output);
        }
        text
    }
}

#[async_trait]
impl FactCheckPort for Supervisor {
    async fn fact_check(&self, query: &str) -> FactCheckResponse {
        Supervisor::fact_check(self, query).await
    }
}

fn enter(state: SupervisorState) {
    debug!(%state, "Supervisor state");
}

fn respond(text: String) -> FactCheckResponse {
    if text.trim().is_empty() {
        warn!("Supervisor produced no output");
        return FactCheckResponse::PlainText(EMPTY_RESPONSE.to_string());
    }
    FactCheckResponse::Structured(StructuredResponse::from_text(text))
}
