//! ReAct agent implementation (Reasoning + Acting)

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::render_prompt;
use crate::agents::config::AgentConfig;
use crate::agents::domain::{
    AgentResponse, Message, TokenUsage, ToolCallResult, ToolDefinition,
};
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::llm::{CompletionRequest, LlmProvider};
use crate::agents::tools::ToolPort;

/// ReAct agent: Reasoning + Action loop with tool calling
///
/// Agents are cheap to build and hold no conversation state, so callers
/// construct one per request.
pub struct ReActAgent {
    config: AgentConfig,
    llm: Arc<dyn LlmProvider>,
    tools: Option<Arc<dyn ToolPort>>,
}

impl ReActAgent {
    /// Create an agent without tools
    pub fn new(config: AgentConfig, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            config,
            llm,
            tools: None,
        }
    }

    /// Give the agent a set of tools
    pub fn with_tools(mut self, tools: Arc<dyn ToolPort>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Get the agent's configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Run the agent on a query until it produces a final answer
    ///
    /// The query is rendered through the configured prompt template first.
    /// The whole run is bounded by `timeout_seconds`.
    pub async fn run(&self, query: &str) -> AgentResult<AgentResponse> {
        let prompt = render_prompt(self.config.prompt_template.as_deref(), query);
        let timeout = self.config.timeout_seconds;

        match tokio::time::timeout(Duration::from_secs(timeout), self.run_loop(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(agent = %self.config.name, timeout, "Agent run timed out");
                Err(AgentError::Timeout(timeout))
            }
        }
    }

    async fn run_loop(&self, prompt: String) -> AgentResult<AgentResponse> {
        let start_time = Instant::now();
        let config = &self.config;

        let mut messages = vec![Message::system(&config.system_prompt), Message::user(prompt)];
        let tools = self.build_tool_definitions().await;

        let mut all_tool_calls: Vec<ToolCallResult> = Vec::new();
        let mut reasoning_steps: Vec<String> = Vec::new();
        let mut usage = TokenUsage::default();
        let mut saw_usage = false;

        for iteration in 0..config.max_iterations {
            tracing::debug!(agent = %config.name, iteration = iteration + 1, "Thinking");

            let request = CompletionRequest {
                messages: messages.clone(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
                tools: if tools.is_empty() { None } else { Some(tools.clone()) },
                ..Default::default()
            };

            let response = self.llm.complete(request).await?;
            if let Some(u) = &response.usage {
                usage.accumulate(u);
                saw_usage = true;
            }

            let message = response.message;
            let tool_calls = message.tool_calls.clone().unwrap_or_default();

            // No tool calls: the model has answered
            if tool_calls.is_empty() {
                return Ok(AgentResponse {
                    content: message.content,
                    tool_calls: all_tool_calls,
                    reasoning_steps,
                    iterations: iteration + 1,
                    usage: saw_usage.then_some(usage),
                    execution_time_ms: start_time.elapsed().as_millis() as u64,
                });
            }

            if !message.content.is_empty() {
                reasoning_steps.push(format!("Iteration {}: {}", iteration + 1, message.content));
            }

            messages.push(message);

            for tool_call in &tool_calls {
                tracing::info!(agent = %config.name, tool = %tool_call.name, "Calling tool");

                let tool_start = Instant::now();
                let result = match &self.tools {
                    Some(tools) => tools
                        .execute_tool(&tool_call.name, tool_call.arguments.clone())
                        .await
                        .map_err(|e| e.to_string()),
                    None => Err(format!("Tool not found: {}", tool_call.name)),
                };
                let tool_time = tool_start.elapsed().as_millis() as u64;

                let tool_result = match result {
                    Ok(output) => ToolCallResult::success(tool_call, output, tool_time),
                    Err(e) => {
                        tracing::warn!(agent = %config.name, tool = %tool_call.name, error = %e, "Tool call failed");
                        ToolCallResult::failure(tool_call, e, tool_time)
                    }
                };

                messages.push(Message::tool_result(&tool_call.id, &tool_result.output));
                all_tool_calls.push(tool_result);
            }
        }

        Err(AgentError::MaxIterations(config.max_iterations))
    }

    async fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        let Some(tools) = &self.tools else {
            return Vec::new();
        };

        match tools.list_tools().await {
            Ok(definitions) => definitions,
            Err(e) => {
                tracing::warn!(agent = %self.config.name, error = %e, "Failed to list tools");
                Vec::new()
            }
        }
    }
}
