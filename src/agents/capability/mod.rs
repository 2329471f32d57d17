//! Capability agents
//!
//! Each capability binds one prompt to zero or more tools and turns text
//! into text. Invocations are independent: every call builds a fresh
//! [`ReActAgent`], so nothing carries over from one call to the next.
//!
//! A capability never fails and never answers with an empty string.
//! Failures come back as text starting with `Error`, and empty model output
//! is replaced with a fixed apology for that capability.

mod claims;
mod evidence;
mod math;

pub use claims::{ClaimExtractor, ClaimList, CLAIM_EXTRACTOR, NO_ERRONEOUS_CLAIMS};
pub use evidence::{EvidenceChecker, Verdict, EVIDENCE_CHECKER, LIMITED_SEARCH_NOTE};
pub use math::{MathValidator, MATH_VALIDATOR};

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::agents::core::ReActAgent;
use crate::agents::domain::ToolDefinition;
use crate::agents::error::AgentError;
use crate::agents::tools::ToolPort;

/// A stateless text-in, text-out specialist
#[async_trait]
pub trait CapabilityAgent: Send + Sync {
    /// Name the supervisor calls this capability by
    fn name(&self) -> &str;

    /// What the capability is for, shown to the supervisor model
    fn description(&self) -> &str;

    /// Run the capability on a query
    async fn invoke(&self, query: &str) -> String;
}

/// Result of one agent run, before a capability turns it into text
pub(crate) enum RunOutcome {
    Answer(String),
    Empty,
    Failed(AgentError),
}

pub(crate) async fn run_once(agent: &ReActAgent, query: &str) -> RunOutcome {
    let name = agent.config().name.clone();
    match agent.run(query).await {
        Ok(response) if !response.content.trim().is_empty() => {
            tracing::debug!(
                agent = %name,
                iterations = response.iterations,
                tool_calls = response.tool_calls.len(),
                "Capability answered"
            );
            RunOutcome::Answer(response.content)
        }
        Ok(_) => {
            tracing::warn!(agent = %name, "Capability produced no output");
            RunOutcome::Empty
        }
        Err(e) => {
            tracing::error!(agent = %name, error = %e, "Capability failed");
            RunOutcome::Failed(e)
        }
    }
}

/// Exposes capability agents to the supervisor as tools
///
/// Each agent becomes a tool named after it taking a single `query` string.
#[derive(Clone)]
pub struct CapabilityToolPort {
    agents: Vec<Arc<dyn CapabilityAgent>>,
}

impl CapabilityToolPort {
    pub fn new(agents: Vec<Arc<dyn CapabilityAgent>>) -> Self {
        Self { agents }
    }

    /// Look up an agent by name
    pub fn agent(&self, name: &str) -> Option<Arc<dyn CapabilityAgent>> {
        self.agents.iter().find(|a| a.name() == name).cloned()
    }

    /// Names of the agents on offer
    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    /// `(name, description)` pairs of the agents on offer
    pub fn descriptions(&self) -> Vec<(&str, &str)> {
        self.agents.iter().map(|a| (a.name(), a.description())).collect()
    }
}

#[async_trait]
impl ToolPort for CapabilityToolPort {
    async fn execute_tool(&self, name: &str, args: Value) -> anyhow::Result<Value> {
        let agent = self
            .agent(name)
            .ok_or_else(|| anyhow::anyhow!("Tool not found: {}", name))?;

        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Missing required argument: query"))?;

        tracing::info!(agent = %name, "Routed to capability");
        Ok(Value::String(agent.invoke(query).await))
    }

    async fn list_tools(&self) -> anyhow::Result<Vec<ToolDefinition>> {
        Ok(self
            .agents
            .iter()
            .map(|agent| {
                ToolDefinition::new(
                    agent.name(),
                    agent.description(),
                    json!({
                        "type": "object",
                        "properties": {
                            "query": {
                                "type": "string",
                                "description": "The text or claim to analyze"
                            }
                        },
                        "required": ["query"]
                    }),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Shout;

    #[async_trait]
    impl CapabilityAgent for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        fn description(&self) -> &str {
            "Upper-cases the query"
        }

        async fn invoke(&self, query: &str) -> String {
            query.to_uppercase()
        }
    }

    #[tokio::test]
    async fn test_capabilities_as_tools() {
        let port = CapabilityToolPort::new(vec![Arc::new(Shout)]);

        let tools = port.list_tools().await.unwrap();
        assert_eq!(tools[0].name, "shout");
        assert_eq!(tools[0].parameters["required"][0], "query");

        let out = port.execute_tool("shout", json!({"query": "hoax"})).await.unwrap();
        assert_eq!(out, Value::String("HOAX".to_string()));

        assert!(port.execute_tool("shout", json!({})).await.is_err());
        assert!(port.execute_tool("whisper", json!({"query": "x"})).await.is_err());
        assert_eq!(port.names(), vec!["shout"]);
        assert_eq!(port.descriptions(), vec![("shout", "Upper-cases the query")]);
    }
}
