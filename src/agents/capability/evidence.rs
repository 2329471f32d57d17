//! Evidence checking: TRUE / FALSE / PARTIALLY TRUE verdicts backed by search

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::{run_once, CapabilityAgent, RunOutcome};
use crate::agents::config::{AgentConfig, AgentLimits};
use crate::agents::core::ReActAgent;
use crate::agents::llm::LlmProvider;
use crate::agents::tools::ToolPort;
use crate::provider::ToolProviderConnector;

pub const EVIDENCE_CHECKER: &str = "evidence_checker";

/// Prefixed to answers produced without external search
pub const LIMITED_SEARCH_NOTE: &str = "[Note: Limited fact-checking without external search] ";

const DESCRIPTION: &str = "Performs deep fact-checking with evidence using web search, \
cross-referencing reliable sources. Provides TRUE/FALSE/PARTIALLY TRUE verdicts with supporting \
evidence. Use for verifying specific factual claims.";

const SYSTEM_PROMPT: &str = r#"You are a fact-checking assistant. You verify claims against evidence.

Instructions:
- Identify the specific claim being made.
- When search tools are available, search for authoritative sources and cross-reference them before deciding.
- When no search tools are available, rely on well-established general knowledge and say so.

Output:
- Start with a verdict line: "Verdict: TRUE", "Verdict: FALSE" or "Verdict: PARTIALLY TRUE". Use exactly one of these three verdicts.
- Follow with the supporting evidence and context, citing sources where you have them.
- Keep the answer concise.
"#;

const PROMPT_TEMPLATE: &str = "Please fact-check this statement and provide a clear verdict \
(TRUE/FALSE/PARTIALLY TRUE) with supporting evidence and context: {{ query }}";

const EMPTY_RESPONSE: &str = "I apologize, but I couldn't fact-check this statement. \
Please provide a clear, specific claim to verify.";

const EMPTY_FALLBACK_RESPONSE: &str = "I apologize, but I couldn't fact-check this statement \
without external search capabilities.";

const FALLBACK_ERROR_PREFIX: &str = "Error during fallback fact-checking";

const VERDICT_REMINDER: &str = "Your previous answer did not state exactly one verdict. \
Answer again, starting with a single line \"Verdict: TRUE\", \"Verdict: FALSE\" or \
\"Verdict: PARTIALLY TRUE\", followed by the supporting evidence.";

enum SearchBinding {
    /// General knowledge only
    Offline,
    /// Tools of a session someone else holds open
    Tools(Arc<dyn ToolPort>),
    /// Open a session per invocation
    Connector(ToolProviderConnector),
}

/// Issues verdicts; uses external search when it has it
///
/// Any failure on the search path falls back to a general-knowledge check
/// whose answer is prefixed with [`LIMITED_SEARCH_NOTE`].
pub struct EvidenceChecker {
    llm: Arc<dyn LlmProvider>,
    limits: AgentLimits,
    search: SearchBinding,
}

impl EvidenceChecker {
    /// Checker without external search
    pub fn new(llm: Arc<dyn LlmProvider>, limits: AgentLimits) -> Self {
        Self {
            llm,
            limits,
            search: SearchBinding::Offline,
        }
    }

    /// Use the tools of an already open provider session
    pub fn with_search(mut self, tools: Arc<dyn ToolPort>) -> Self {
        self.search = SearchBinding::Tools(tools);
        self
    }

    /// Open a provider session for each invocation
    pub fn with_connector(mut self, connector: ToolProviderConnector) -> Self {
        self.search = SearchBinding::Connector(connector);
        self
    }

    fn build(&self, tools: Option<Arc<dyn ToolPort>>) -> ReActAgent {
        let config = AgentConfig::new(EVIDENCE_CHECKER, DESCRIPTION, SYSTEM_PROMPT)
            .with_prompt_template(PROMPT_TEMPLATE)
            .with_agent_limits(self.limits);
        let agent = ReActAgent::new(config, self.llm.clone());
        match tools {
            Some(tools) => agent.with_tools(tools),
            None => agent,
        }
    }

    async fn check_with_search(&self, tools: Arc<dyn ToolPort>, query: &str) -> anyhow::Result<String> {
        info!("Routed to evidence checker with external search");
        match run_once(&self.build(Some(tools.clone())), query).await {
            RunOutcome::Answer(text) if Verdict::is_single(&text) => Ok(text),
            RunOutcome::Answer(text) => Ok(self.reask_for_verdict(tools, query, text).await),
            RunOutcome::Empty => Ok(EMPTY_RESPONSE.to_string()),
            RunOutcome::Failed(e) => Err(e.into()),
        }
    }

    /// Ask once more for a single verdict, keeping the first answer if the
    /// retry does not have one either
    async fn reask_for_verdict(&self, tools: Arc<dyn ToolPort>, query: &str, answer: String) -> String {
        warn!("Evidence checker answer has no single verdict; asking again");
        let retry = format!("{}\n\n{}\n\nPrevious answer:\n{}", query, VERDICT_REMINDER, answer);
        match run_once(&self.build(Some(tools)), &retry).await {
            RunOutcome::Answer(text) if Verdict::is_single(&text) => text,
            _ => {
                warn!("Evidence checker still gave no single verdict; keeping the first answer");
                answer
            }
        }
    }

    async fn check_without_search(&self, query: &str) -> String {
        info!("Using fallback fact-checking without external search");
        match run_once(&self.build(None), query).await {
            RunOutcome::Answer(text) => format!("{}{}", LIMITED_SEARCH_NOTE, text),
            RunOutcome::Empty => EMPTY_FALLBACK_RESPONSE.to_string(),
            RunOutcome::Failed(e) => format!("{}: {}", FALLBACK_ERROR_PREFIX, e),
        }
    }
}

#[async_trait]
impl CapabilityAgent for EvidenceChecker {
    fn name(&self) -> &str {
        EVIDENCE_CHECKER
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn invoke(&self, query: &str) -> String {
        let live = match &self.search {
            SearchBinding::Offline => None,
            SearchBinding::Tools(tools) => Some(self.check_with_search(tools.clone(), query).await),
            SearchBinding::Connector(connector) => Some(
                connector
                    .scoped(|tools| self.check_with_search(tools, query))
                    .await,
            ),
        };

        match live {
            Some(Ok(text)) => text,
            Some(Err(e)) => {
                warn!("Search-backed fact-checking failed, using fallback: {}", e);
                self.check_without_search(query).await
            }
            None => self.check_without_search(query).await,
        }
    }
}

/// A fact-check verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    True,
    False,
    PartiallyTrue,
}

impl Verdict {
    /// Find the verdict in an answer
    ///
    /// Tokens must be upper case and stand alone (`UNTRUE` does not count).
    /// `PARTIALLY TRUE` wins over the bare `TRUE` it contains; otherwise the
    /// earliest token wins.
    pub fn parse(text: &str) -> Option<Self> {
        if find_token(text, "PARTIALLY TRUE").is_some() {
            return Some(Verdict::PartiallyTrue);
        }

        match (find_token(text, "TRUE"), find_token(text, "FALSE")) {
            (Some(t), Some(f)) if t < f => Some(Verdict::True),
            (Some(_), Some(_)) => Some(Verdict::False),
            (Some(_), None) => Some(Verdict::True),
            (None, Some(_)) => Some(Verdict::False),
            (None, None) => None,
        }
    }

    /// Whether the answer names both `TRUE` and `FALSE` with no
    /// `PARTIALLY TRUE` to settle it
    pub fn is_ambiguous(text: &str) -> bool {
        find_token(text, "PARTIALLY TRUE").is_none()
            && find_token(text, "TRUE").is_some()
            && find_token(text, "FALSE").is_some()
    }

    /// Exactly one verdict can be read from the answer
    pub fn is_single(text: &str) -> bool {
        Self::parse(text).is_some() && !Self::is_ambiguous(text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::True => "TRUE",
            Verdict::False => "FALSE",
            Verdict::PartiallyTrue => "PARTIALLY TRUE",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte offset of the first standalone occurrence of `token`
fn find_token(text: &str, token: &str) -> Option<usize> {
    text.match_indices(token).map(|(i, _)| i).find(|&i| {
        let before = text[..i].chars().next_back();
        let after = text[i + token.len()..].chars().next();
        !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_parse() {
        assert_eq!(Verdict::parse("Verdict: FALSE\nThe wall is too narrow."), Some(Verdict::False));
        assert_eq!(Verdict::parse("Verdict: TRUE"), Some(Verdict::True));
        assert_eq!(
            Verdict::parse("Verdict: PARTIALLY TRUE - it is TRUE for low orbit only"),
            Some(Verdict::PartiallyTrue)
        );
        assert_eq!(Verdict::parse("This is UNTRUE"), None);
        assert_eq!(Verdict::parse("no verdict here, true or false"), None);
    }

    #[test]
    fn test_earliest_verdict_wins() {
        assert_eq!(Verdict::parse("FALSE. It was never TRUE."), Some(Verdict::False));
        assert_eq!(Verdict::parse("TRUE, not FALSE"), Some(Verdict::True));
    }

    #[test]
    fn test_single_verdict() {
        assert!(Verdict::is_single("Verdict: FALSE\nThe wall is too narrow."));
        assert!(Verdict::is_single("Verdict: PARTIALLY TRUE. Parts are FALSE."));
        assert!(Verdict::is_ambiguous("TRUE for some, FALSE for others"));
        assert!(!Verdict::is_single("TRUE for some, FALSE for others"));
        assert!(!Verdict::is_single("The evidence is mixed."));
    }

    #[test]
    fn test_display() {
        assert_eq!(Verdict::PartiallyTrue.to_string(), "PARTIALLY TRUE");
    }
}
