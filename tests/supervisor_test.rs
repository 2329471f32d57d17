mod common;

use common::*;
use factcheck::agents::domain::FactCheckResponse;
use factcheck::agents::LlmError;
use factcheck::supervisor::{FactCheckPort, Supervisor};
use serde_json::json;

const GREAT_WALL: &str = "Fact-check: The Great Wall of China is visible from space";

#[tokio::test]
async fn test_full_path_uses_evidence_checker_with_search() {
    let llm = ScriptedProvider::new(|r| {
        if is_agent(r, SUPERVISOR) {
            if after_tool(r) {
                return text("Assessment: FALSE. The wall is too narrow to see from orbit.");
            }
            return call("evidence_checker", json!({"query": "The Great Wall of China is visible from space"}));
        }
        if is_agent(r, EVIDENCE) {
            if after_tool(r) {
                let evidence = last_tool_output(r).unwrap_or_default();
                return text(&format!("Verdict: FALSE\n{}", evidence));
            }
            return call("search", json!({"query": "Great Wall visible from space"}));
        }
        text("unexpected")
    });
    let launcher = MockLauncher::new(Faults::default());
    let supervisor = Supervisor::new(llm.clone(), Some(launcher.connector()));

    let response = supervisor.fact_check(GREAT_WALL).await;

    assert!(matches!(response, FactCheckResponse::Structured(_)));
    assert_eq!(response.text(), "Assessment: FALSE. The wall is too narrow to see from orbit.");
    assert_eq!(launcher.log.launched(), 1);
    assert_eq!(launcher.log.closed(), 1);
    assert_eq!(launcher.log.calls()[0].0, "search");

    let routed = llm.requests_for(SUPERVISOR);
    assert!(routed[0].tool_names().contains(&"evidence_checker"));
    assert!(user_prompt(&routed[0]).contains("Routing notes"));
    let evidence = last_tool_output(routed.last().unwrap()).unwrap();
    assert!(evidence.starts_with("Verdict: FALSE"));
    assert!(evidence.contains("NASA"));
    assert!(llm.requests_for(EDITOR).is_empty());
}

#[tokio::test]
async fn test_without_connector_uses_reduced_agents() {
    let llm = ScriptedProvider::new(|r| {
        if is_agent(r, SUPERVISOR) {
            if after_tool(r) {
                return text(&format!("Assessment: {}", last_tool_output(r).unwrap_or_default()));
            }
            return call("claim_extractor", json!({"query": "The Eiffel Tower is in Berlin"}));
        }
        if is_agent(r, CLAIMS) {
            return text("Here is what I found:\n1. \"The Eiffel Tower is in Berlin\"\nIt is in Paris.");
        }
        text("unexpected")
    });
    let supervisor = Supervisor::new(llm.clone(), None);
    assert!(!supervisor.has_search());

    let response = supervisor.fact_check("The Eiffel Tower is in Berlin").await;
    assert_eq!(response.text(), "Assessment: 1. \"The Eiffel Tower is in Berlin\"");

    for request in llm.requests_for(SUPERVISOR) {
        let tools = request.tool_names();
        assert_eq!(tools, vec!["math_validator", "claim_extractor"]);
        assert!(request.system_prompt().unwrap().contains("External search is unavailable"));
    }
}

#[tokio::test]
async fn test_failing_search_call_still_closes_session() {
    let llm = ScriptedProvider::new(|r| {
        if is_agent(r, SUPERVISOR) {
            if after_tool(r) {
                return text(&format!("Assessment: {}", last_tool_output(r).unwrap_or_default()));
            }
            return call("evidence_checker", json!({"query": "The Great Wall of China is visible from space"}));
        }
        if is_agent(r, EVIDENCE) {
            if after_tool(r) {
                return text("Verdict: FALSE\nSearch failed; general knowledge says it is too narrow.");
            }
            return call("search", json!({"query": "Great Wall visible from space"}));
        }
        text("unexpected")
    });
    let launcher = MockLauncher::new(Faults {
        call_tool: true,
        ..Default::default()
    });
    let supervisor = Supervisor::new(llm.clone(), Some(launcher.connector()));

    let response = supervisor.fact_check(GREAT_WALL).await;

    assert!(!response.is_error());
    assert!(response.text().starts_with("Assessment: Verdict: FALSE"));
    assert_eq!(launcher.log.launched(), 1);
    assert_eq!(launcher.log.closed(), 1);
    assert_eq!(launcher.log.calls().len(), 1);
    let evidence = llm.requests_for(EVIDENCE);
    assert!(last_tool_output(evidence.last().unwrap()).unwrap().contains("Search backend unavailable"));
}

#[tokio::test]
async fn test_launch_failure_falls_back() {
    let llm = ScriptedProvider::new(|r| {
        if is_agent(r, SUPERVISOR) {
            return text("General-knowledge assessment: likely FALSE.");
        }
        text("unexpected")
    });
    let launcher = MockLauncher::new(Faults {
        launch: true,
        ..Default::default()
    });
    let supervisor = Supervisor::new(llm.clone(), Some(launcher.connector()));

    let response = supervisor.fact_check("The moon landing was staged").await;

    assert_eq!(response.text(), "General-knowledge assessment: likely FALSE.");
    assert_eq!(launcher.log.launched(), 0);
    assert_eq!(launcher.log.closed(), 0);
    assert!(llm
        .requests_for(SUPERVISOR)
        .iter()
        .all(|r| !r.tool_names().contains(&"evidence_checker")));
}

#[tokio::test]
async fn test_tool_listing_failure_closes_session_and_falls_back() {
    let llm = ScriptedProvider::new(|_| text("Fallback assessment"));
    let launcher = MockLauncher::new(Faults {
        list_tools: true,
        ..Default::default()
    });
    let supervisor = Supervisor::new(llm, Some(launcher.connector()));

    let response = supervisor.fact_check("Bats are blind").await;

    assert_eq!(response.text(), "Fallback assessment");
    assert_eq!(launcher.log.launched(), 1);
    assert_eq!(launcher.log.closed(), 1);
}

#[tokio::test]
async fn test_full_path_error_closes_session_and_falls_back() {
    let llm = ScriptedProvider::new(|r| {
        if r.tool_names().contains(&"evidence_checker") {
            return Err(LlmError::Network("connection reset".to_string()));
        }
        text("Fallback assessment")
    });
    let launcher = MockLauncher::new(Faults::default());
    let supervisor = Supervisor::new(llm, Some(launcher.connector()));

    let response = supervisor.fact_check(GREAT_WALL).await;

    assert!(matches!(response, FactCheckResponse::Structured(_)));
    assert_eq!(response.text(), "Fallback assessment");
    assert_eq!(launcher.log.closed(), 1);
}

#[tokio::test]
async fn test_full_path_panic_closes_session_and_falls_back() {
    let llm = ScriptedProvider::new(|r| {
        if r.tool_names().contains(&"evidence_checker") {
            panic!("provider exploded");
        }
        text("Fallback assessment")
    });
    let launcher = MockLauncher::new(Faults::default());
    let supervisor = Supervisor::new(llm, Some(launcher.connector()));

    let response = supervisor.fact_check(GREAT_WALL).await;

    assert_eq!(response.text(), "Fallback assessment");
    assert_eq!(launcher.log.launched(), 1);
    assert_eq!(launcher.log.closed(), 1);
}

#[tokio::test]
async fn test_each_request_gets_its_own_session() {
    let llm = ScriptedProvider::new(|_| text("Assessment"));
    let launcher = MockLauncher::new(Faults::default());
    let supervisor = Supervisor::new(llm, Some(launcher.connector()));

    supervisor.fact_check("Goldfish have a three-second memory").await;
    supervisor.fact_check("Lightning never strikes twice").await;

    assert_eq!(launcher.log.launched(), 2);
    assert_eq!(launcher.log.closed(), 2);
}

#[tokio::test]
async fn test_numeric_claim_always_reaches_math_validator() {
    let llm = ScriptedProvider::new(|r| {
        if is_agent(r, SUPERVISOR) {
            return text("Draft: the statement looks plausible.");
        }
        if is_agent(r, MATH) {
            if after_tool(r) {
                return text("12% of 250 is 30, not 40. The claim is FALSE.");
            }
            return call("calculator", json!({"expression": "250 * 12 / 100"}));
        }
        if is_agent(r, EDITOR) {
            return text("Final: FALSE. 12% of 250 is 30.");
        }
        text("unexpected")
    });
    let supervisor = Supervisor::new(llm.clone(), None);

    let response = supervisor.fact_check("12% of 250 is 40").await;

    assert_eq!(response.text(), "Final: FALSE. 12% of 250 is 30.");

    let math = llm.requests_for(MATH);
    assert_eq!(math.len(), 2);
    assert!(last_tool_output(&math[1]).unwrap().contains("30"));

    let editor = llm.requests_for(EDITOR);
    assert_eq!(editor.len(), 1);
    let prompt = user_prompt(&editor[0]);
    assert!(prompt.contains("Draft: the statement looks plausible."));
    assert!(prompt.contains("Findings from math_validator"));
    assert!(prompt.contains("12% of 250 is 30, not 40."));
}

#[tokio::test]
async fn test_failed_aggregation_appends_findings() {
    let llm = ScriptedProvider::new(|r| {
        if is_agent(r, SUPERVISOR) {
            return text("Draft assessment.");
        }
        if is_agent(r, MATH) {
            return text("2 + 2 is 4, not 5.");
        }
        Err(LlmError::Api {
            status: 500,
            message: "overloaded".to_string(),
        })
    });
    let supervisor = Supervisor::new(llm, None);

    let response = supervisor.fact_check("Everyone knows 2 + 2 = 5").await;

    assert_eq!(response.text(), "Draft assessment.\n\n2 + 2 is 4, not 5.");
}

#[tokio::test]
async fn test_empty_aggregation_appends_findings() {
    let llm = ScriptedProvider::new(|r| {
        if is_agent(r, SUPERVISOR) {
            return text("Draft assessment.");
        }
        if is_agent(r, MATH) {
            return text("2 + 2 is 4, not 5.");
        }
        text("  ")
    });
    let supervisor = Supervisor::new(llm.clone(), None);

    let response = supervisor.fact_check("Everyone knows 2 + 2 = 5").await;

    assert_eq!(response.text(), "Draft assessment.\n\n2 + 2 is 4, not 5.");
    assert_eq!(llm.requests_for(EDITOR).len(), 1);
}

#[tokio::test]
async fn test_total_failure_returns_plain_text_error() {
    let llm = ScriptedProvider::new(|_| Err(LlmError::Authentication("invalid x-api-key".to_string())));
    let launcher = MockLauncher::new(Faults::default());
    let supervisor = Supervisor::new(llm, Some(launcher.connector()));

    let response = supervisor.fact_check(GREAT_WALL).await;

    match &response {
        FactCheckResponse::PlainText(text) => {
            assert!(text.starts_with("Error processing fact-check request"));
            assert!(text.contains("invalid x-api-key"));
        }
        other => panic!("expected plain text, got {:?}", other),
    }
    assert!(response.is_error());
    assert_eq!(launcher.log.closed(), 1);
}

#[tokio::test]
async fn test_supervisor_as_fact_check_port() {
    let llm = ScriptedProvider::new(|_| text("Assessment via port"));
    let supervisor = Supervisor::new(llm, None);
    let port: &dyn FactCheckPort = &supervisor;

    assert_eq!(port.fact_check("Water boils at 90C at sea level").await.text(), "Assessment via port");
}
