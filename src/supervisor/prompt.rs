//! Supervisor prompts

use serde::Serialize;
use tera::{Context, Tera};

use crate::agents::capability::{CLAIM_EXTRACTOR, EVIDENCE_CHECKER, MATH_VALIDATOR};
use crate::agents::core::render_prompt;

const SYSTEM_TEMPLATE: &str = r#"You are a misinformation detection orchestrator that coordinates specialized agents for content analysis and fact-checking. Your mission is to detect, analyze, and verify information for potential misinformation.

## Available Specialized Agents

You have access to these specialized agents, each callable as a tool with a single `query` argument:
{% for agent in agents %}
{{ loop.index }}. **{{ agent.name }}**
   - {{ agent.description }}
{% endfor %}
## Orchestration Strategy

### Step 1: Initial Analysis
{% if claim_extractor %}- Use **{{ claim_extractor }}** to segment the content and identify potentially problematic statements.
{% else %}- Segment the content into individual claims yourself.
{% endif %}
### Step 2: Specialized Verification
{% if math_validator %}- For mathematical or statistical claims, use **{{ math_validator }}**.
{% endif %}{% if evidence_checker %}- For factual claims requiring evidence, use **{{ evidence_checker }}**.
{% else %}- External search is unavailable: assess factual claims from general knowledge and say so.
{% endif %}- For complex claims, coordinate multiple agents as needed.

### Step 3: Synthesis
- Combine the results from all agents into one coherent assessment.
- Give a concise verdict with evidence for each claim.
- Highlight the most concerning misinformation risks first.

Provide clear, evidence-based conclusions.
"#;

const QUERY_TEMPLATE: &str = "Provide a comprehensive fact-check assessment for this text: {{ query }}";

pub(crate) const AGGREGATION_SYSTEM_PROMPT: &str = "You are a fact-check editor. You receive a draft \
assessment and additional findings from specialist agents. Merge them into one coherent assessment \
that foregrounds the most concerning findings. Where the findings correct the draft (for example a \
recalculated figure), the findings win. Do not mention the agents or the drafting process.";

#[derive(Serialize)]
struct AgentEntry<'a> {
    name: &'a str,
    description: &'a str,
}

/// System prompt describing the agents on offer
pub(crate) fn system_prompt(agents: &[(&str, &str)]) -> String {
    let entries: Vec<AgentEntry> = agents
        .iter()
        .map(|(name, description)| AgentEntry { name, description })
        .collect();
    let offered = |name: &'static str| agents.iter().any(|(n, _)| *n == name).then_some(name);

    let mut context = Context::new();
    context.insert("agents", &entries);
    context.insert("claim_extractor", &offered(CLAIM_EXTRACTOR));
    context.insert("math_validator", &offered(MATH_VALIDATOR));
    context.insert("evidence_checker", &offered(EVIDENCE_CHECKER));

    match Tera::one_off(SYSTEM_TEMPLATE, &context, false) {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::warn!("Failed to render supervisor prompt: {}", e);
            let names: Vec<&str> = agents.iter().map(|(n, _)| *n).collect();
            format!(
                "You are a fact-checking orchestrator. Use these agents as tools: {}. \
                 Combine their results into one concise assessment.",
                names.join(", ")
            )
        }
    }
}

/// User prompt for the supervisor, with optional routing notes
pub(crate) fn user_prompt(query: &str, guidance: Option<&str>) -> String {
    let prompt = render_prompt(Some(QUERY_TEMPLATE), query);
    match guidance {
        Some(notes) => format!("{}\n\n{}", prompt, notes),
        None => prompt,
    }
}

/// Request folding extra findings into a draft assessment
pub(crate) fn aggregation_prompt(query: &str, draft: &str, findings: &[(&str, String)]) -> String {
    let mut prompt = format!("Text under review:\n{}\n\nDraft assessment:\n{}\n", query, draft);
    for (name, output) in findings {
        prompt.push_str(&format!("\nFindings from {}:\n{}\n", name, output));
    }
    prompt.push_str("\nWrite the final fact-check assessment.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_agents() {
        let prompt = system_prompt(&[
            (MATH_VALIDATOR, "checks numbers"),
            (CLAIM_EXTRACTOR, "finds claims"),
            (EVIDENCE_CHECKER, "checks evidence"),
        ]);
        assert!(prompt.contains("1. **math_validator**"));
        assert!(prompt.contains("- checks evidence"));
        assert!(prompt.contains("use **evidence_checker**"));
        assert!(!prompt.contains("External search is unavailable"));
    }

    #[test]
    fn test_system_prompt_without_evidence_checker() {
        let prompt = system_prompt(&[(MATH_VALIDATOR, "checks numbers"), (CLAIM_EXTRACTOR, "finds claims")]);
        assert!(!prompt.contains(EVIDENCE_CHECKER));
        assert!(prompt.contains("External search is unavailable"));
        assert!(prompt.contains("use **claim_extractor**"));
    }

    #[test]
    fn test_user_prompt() {
        assert_eq!(
            user_prompt("12% of 250 is 40", None),
            "Provide a comprehensive fact-check assessment for this text: 12% of 250 is 40"
        );
        assert!(user_prompt("x", Some("Routing notes:\n- y")).ends_with("\n\nRouting notes:\n- y"));
    }
}
