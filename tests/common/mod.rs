//! Shared fixtures: a scripted LLM provider and fault-injectable tool
//! provider sessions

#![allow(dead_code)]

use async_trait::async_trait;
use factcheck::agents::domain::{Message, Role, ToolCall, ToolDefinition};
use factcheck::agents::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};
use factcheck::agents::LlmResult;
use factcheck::provider::{ProviderSession, SessionLauncher, ToolProviderConnector};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Script = dyn Fn(&CompletionRequest) -> LlmResult<CompletionResponse> + Send + Sync;

/// LLM provider answering every request through a closure
pub struct ScriptedProvider {
    script: Box<Script>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(&CompletionRequest) -> LlmResult<CompletionResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose system prompt contains `marker`
    pub fn requests_for(&self, marker: &str) -> Vec<CompletionRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.system_prompt().map_or(false, |s| s.contains(marker)))
            .collect()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        (self.script)(&request)
    }
}

/// System prompt markers for each agent
pub const SUPERVISOR: &str = "misinformation detection orchestrator";
pub const MATH: &str = "You are a math wizard";
pub const CLAIMS: &str = "identifying erroneous or misleading claims";
pub const EVIDENCE: &str = "You are a fact-checking assistant";
pub const EDITOR: &str = "You are a fact-check editor";

pub fn is_agent(request: &CompletionRequest, marker: &str) -> bool {
    request.system_prompt().map_or(false, |s| s.contains(marker))
}

/// Whether the last message is a tool result (the model already called a tool)
pub fn after_tool(request: &CompletionRequest) -> bool {
    request.messages.last().map(|m| m.role) == Some(Role::Tool)
}

/// Content of the last tool result in a request
pub fn last_tool_output(request: &CompletionRequest) -> Option<String> {
    request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Tool)
        .map(|m| m.content.clone())
}

/// User prompt of a request
pub fn user_prompt(request: &CompletionRequest) -> String {
    request
        .messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.clone())
        .unwrap_or_default()
}

pub fn text(content: &str) -> LlmResult<CompletionResponse> {
    Ok(CompletionResponse::text(content))
}

pub fn call(tool: &str, arguments: Value) -> LlmResult<CompletionResponse> {
    Ok(CompletionResponse {
        message: Message::assistant_with_tools(
            "",
            vec![ToolCall::new(ToolCall::generate_id(), tool, arguments)],
        ),
        finish_reason: FinishReason::ToolCalls,
        usage: None,
    })
}

/// What a [`MockLauncher`] should get wrong
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    pub launch: bool,
    pub list_tools: bool,
    pub call_tool: bool,
}

/// Observations shared by every session a launcher opens
#[derive(Default)]
pub struct SessionLog {
    pub launched: AtomicUsize,
    pub closed: AtomicUsize,
    pub calls: Mutex<Vec<(String, Value)>>,
}

impl SessionLog {
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

pub struct MockLauncher {
    pub faults: Faults,
    pub log: Arc<SessionLog>,
}

impl MockLauncher {
    pub fn new(faults: Faults) -> Arc<Self> {
        Arc::new(Self {
            faults,
            log: Arc::new(SessionLog::default()),
        })
    }

    pub fn connector(self: &Arc<Self>) -> ToolProviderConnector {
        ToolProviderConnector::with_launcher(self.clone(), Duration::from_secs(5))
    }
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    fn describe(&self) -> String {
        "mock-search".to_string()
    }

    async fn launch(&self) -> anyhow::Result<Arc<dyn ProviderSession>> {
        if self.faults.launch {
            anyhow::bail!("Failed to spawn mock-search: not installed");
        }
        self.log.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockSession {
            faults: self.faults,
            log: self.log.clone(),
        }))
    }
}

struct MockSession {
    faults: Faults,
    log: Arc<SessionLog>,
}

#[async_trait]
impl ProviderSession for MockSession {
    async fn list_tools(&self) -> anyhow::Result<Vec<ToolDefinition>> {
        if self.faults.list_tools {
            anyhow::bail!("Provider did not answer tools/list");
        }
        Ok(vec![ToolDefinition::new(
            "search",
            "Search the web",
            json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
        )])
    }

    async fn call_tool(&self, name: &str, args: Value) -> anyhow::Result<Value> {
        self.log.calls.lock().unwrap().push((name.to_string(), args));
        if self.faults.call_tool {
            anyhow::bail!("Search backend unavailable");
        }
        Ok(json!("NASA: the Great Wall is not visible to the naked eye from orbit."))
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.log.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
