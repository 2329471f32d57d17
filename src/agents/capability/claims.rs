//! Claim extraction: segment text into statements and quote the erroneous ones

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use super::{run_once, CapabilityAgent, RunOutcome};
use crate::agents::config::{AgentConfig, AgentLimits};
use crate::agents::core::ReActAgent;
use crate::agents::llm::LlmProvider;

pub const CLAIM_EXTRACTOR: &str = "claim_extractor";

/// The only answer allowed when nothing is flagged
pub const NO_ERRONEOUS_CLAIMS: &str = "No erroneous claims found.";

const DESCRIPTION: &str = "Breaks input text into separate statements and identifies potentially \
false or misleading claims. Returns a numbered list of erroneous claims as direct quotations. \
Use for initial content analysis and identifying suspicious claims.";

const SYSTEM_PROMPT: &str = r#"You are an assistant specialized in identifying erroneous or misleading claims in text.

Instructions:
- Break down the input text into separate statements.
- For each statement, determine if it contains misinformation, disinformation, or is otherwise clearly false or misleading.
- Fact-check statements using general knowledge and logical reasoning. Look for fabrication, manipulation, or critical omissions.

Output:
- Return a numbered list of all statements you identify as erroneous, incorrect, or misleading.
- Each listed item should be the erroneous claim as a direct quotation.
- If there are no erroneous statements, return 'No erroneous claims found.'
- Do not return any explanations, extra text, or formatting.

Example 1
Input:
Climate change is a hoax invented by scientists. The Great Wall of China is visible from space.

Output:
1. "Climate change is a hoax invented by scientists."
2. "The Great Wall of China is visible from space."

Example 2
Input:
The Pacific Ocean is the largest ocean on Earth. Drinking bleach can cure illnesses.

Output:
1. "Drinking bleach can cure illnesses."

Example 3
Input:

Output:
No erroneous claims found.
"#;

const PROMPT_TEMPLATE: &str =
    "Please identify erroneous or misleading claims with supporting evidence and context: {{ query }}";

const EMPTY_RESPONSE: &str = "I apologize, but I couldn't identify any erroneous claims. \
Please check if your query is clearly stated or try rephrasing it.";

const ERROR_PREFIX: &str = "Error identifying erroneous claims";

/// Flags erroneous statements; has no tools
pub struct ClaimExtractor {
    llm: Arc<dyn LlmProvider>,
    limits: AgentLimits,
}

impl ClaimExtractor {
    pub fn new(llm: Arc<dyn LlmProvider>, limits: AgentLimits) -> Self {
        Self { llm, limits }
    }

    fn build(&self) -> ReActAgent {
        let config = AgentConfig::new(CLAIM_EXTRACTOR, DESCRIPTION, SYSTEM_PROMPT)
            .with_prompt_template(PROMPT_TEMPLATE)
            .with_agent_limits(self.limits);
        ReActAgent::new(config, self.llm.clone())
    }
}

#[async_trait]
impl CapabilityAgent for ClaimExtractor {
    fn name(&self) -> &str {
        CLAIM_EXTRACTOR
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn invoke(&self, query: &str) -> String {
        match run_once(&self.build(), query).await {
            RunOutcome::Answer(text) => normalize(&text),
            RunOutcome::Empty => EMPTY_RESPONSE.to_string(),
            RunOutcome::Failed(e) => format!("{}: {}", ERROR_PREFIX, e),
        }
    }
}

/// Render a model answer in the extractor's output format
///
/// Flagged items become the numbered quotation list. The no-claims literal
/// is only produced when the answer says so; anything else is kept as is.
fn normalize(answer: &str) -> String {
    let list = ClaimList::parse(answer);
    if !list.is_empty() || states_no_claims(answer) {
        return list.to_string();
    }
    warn!("Claim extractor answer has no list items; returning it unchanged");
    answer.trim().to_string()
}

/// Whether the text is the no-claims answer, give or take quotes, case and
/// the trailing period
fn states_no_claims(text: &str) -> bool {
    let text = text.trim();
    let text = quotation(text).unwrap_or(text);
    text.trim()
        .trim_end_matches('.')
        .eq_ignore_ascii_case(NO_ERRONEOUS_CLAIMS.trim_end_matches('.'))
}

/// Numbered list of quoted erroneous claims
///
/// Renders as `1. "claim"` lines, or as [`NO_ERRONEOUS_CLAIMS`] when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimList {
    claims: Vec<String>,
}

impl ClaimList {
    pub fn new(claims: Vec<String>) -> Self {
        Self { claims }
    }

    /// Extract list items from model output
    ///
    /// Numbered (`1.`, `2)`) and bulleted (`- `, `* `, `• `) lines count as
    /// items and everything else is prose. Without any such line, lines that
    /// are a single quotation are the items. A quoted item keeps only the
    /// quotation.
    pub fn parse(text: &str) -> Self {
        let mut claims: Vec<String> = text
            .lines()
            .filter_map(|line| strip_marker(line.trim()))
            .map(unquote)
            .filter(|claim| !claim.is_empty())
            .collect();

        if claims.is_empty() {
            claims = text
                .lines()
                .map(str::trim)
                .filter(|line| !states_no_claims(line))
                .filter_map(quotation)
                .map(|claim| claim.trim().to_string())
                .filter(|claim| !claim.is_empty())
                .collect();
        }
        Self { claims }
    }

    pub fn claims(&self) -> &[String] {
        &self.claims
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }
}

impl std::fmt::Display for ClaimList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.claims.is_empty() {
            return f.write_str(NO_ERRONEOUS_CLAIMS);
        }
        for (i, claim) in self.claims.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}. \"{}\"", i + 1, claim)?;
        }
        Ok(())
    }
}

fn strip_marker(line: &str) -> Option<&str> {
    for bullet in ['-', '*', '•'] {
        if let Some(rest) = line.strip_prefix(bullet) {
            if rest.starts_with(char::is_whitespace) {
                return Some(rest.trim_start());
            }
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .map(str::trim_start)
}

fn closing_quote(open: char) -> Option<char> {
    match open {
        '"' => Some('"'),
        '“' => Some('”'),
        '\'' => Some('\''),
        _ => None,
    }
}

/// Inside of a line that is one quotation, allowing trailing punctuation
fn quotation(line: &str) -> Option<&str> {
    let open = line.chars().next()?;
    let close = closing_quote(open)?;
    let inner = &line[open.len_utf8()..];
    let end = inner.rfind(close)?;
    let tail = &inner[end + close.len_utf8()..];
    if tail.chars().all(|c| matches!(c, '.' | ',' | ';' | ' ')) {
        Some(&inner[..end])
    } else {
        None
    }
}

fn unquote(item: &str) -> String {
    let item = item.trim();
    let mut chars = item.chars();
    let Some(open) = chars.next() else {
        return String::new();
    };
    let Some(close) = closing_quote(open) else {
        return item.to_string();
    };

    let inner = &item[open.len_utf8()..];
    match inner.find(close) {
        Some(end) => inner[..end].trim().to_string(),
        None => inner.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_quotes() {
        let text = "1. \"Climate change is a hoax invented by scientists.\"\n2. \"The Great Wall of China is visible from space.\"";
        let list = ClaimList::parse(text);
        assert_eq!(list.len(), 2);
        assert_eq!(list.claims()[1], "The Great Wall of China is visible from space.");
        assert_eq!(list.to_string(), text);
    }

    #[test]
    fn test_parse_drops_prose_and_commentary() {
        let text = "Here are the claims:\n1) “Drinking bleach can cure illnesses.” - dangerous\n- Vaccines contain microchips";
        let list = ClaimList::parse(text);
        assert_eq!(
            list.claims(),
            &[
                "Drinking bleach can cure illnesses.".to_string(),
                "Vaccines contain microchips".to_string()
            ]
        );
    }

    #[test]
    fn test_no_claims_renders_literal() {
        assert_eq!(normalize("No erroneous claims found."), NO_ERRONEOUS_CLAIMS);
        assert_eq!(normalize("'No erroneous claims found.'"), NO_ERRONEOUS_CLAIMS);
        assert_eq!(normalize("  \"no erroneous claims found\"\n"), NO_ERRONEOUS_CLAIMS);
        assert!(ClaimList::parse("'No erroneous claims found.'").is_empty());
    }

    #[test]
    fn test_unmarked_quotation_is_a_claim() {
        let list = ClaimList::parse("\"Drinking bleach can cure illnesses.\"");
        assert_eq!(list.claims(), &["Drinking bleach can cure illnesses.".to_string()]);
        assert_eq!(
            normalize("\"Drinking bleach can cure illnesses.\""),
            "1. \"Drinking bleach can cure illnesses.\""
        );
    }

    #[test]
    fn test_unrecognised_answer_passes_through() {
        let answer = "The claim that the moon is made of cheese is false.";
        assert_eq!(normalize(answer), answer);
        assert_ne!(normalize("All statements look accurate."), NO_ERRONEOUS_CLAIMS);
    }

    #[test]
    fn test_bold_heading_is_not_a_claim() {
        let list = ClaimList::parse("**Erroneous claims:**\n1. \"Vaccines cause autism\"");
        assert_eq!(list.len(), 1);
        assert_eq!(list.claims()[0], "Vaccines cause autism");

        let list = ClaimList::parse("* \"Bats are blind\"\n*Note:* checked against general knowledge");
        assert_eq!(list.claims(), &["Bats are blind".to_string()]);
    }

    #[test]
    fn test_years_are_not_list_markers() {
        assert!(ClaimList::parse("2024 was a warm year.").is_empty());
    }
}
