//! Anthropic LLM Provider

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;

use super::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider, ToolChoice};
use crate::agents::config::LlmProviderConfig;
use crate::agents::domain::{Message, Role, TokenUsage, ToolCall};
use crate::agents::error::{LlmError, LlmResult};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic LLM Provider
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    default_temperature: Option<f32>,
    default_max_tokens: Option<u32>,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &LlmProviderConfig) -> LlmResult<Self> {
        let env_var = config.api_key_env.as_deref().unwrap_or("ANTHROPIC_API_KEY");
        let api_key = env::var(env_var).map_err(|_| {
            LlmError::Authentication(format!("Environment variable {} not set", env_var))
        })?;

        Ok(Self::with_api_key(config, api_key))
    }

    /// Create a provider with an explicit API key
    pub fn with_api_key(config: &LlmProviderConfig, api_key: impl Into<String>) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url,
            model: config.model.clone(),
            default_temperature: config.temperature,
            default_max_tokens: config.max_tokens,
        }
    }

    /// Build the request body for Anthropic API
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let (system_prompt, messages) = convert_messages(&request.messages);

        let mut body = json!({
            "model": request.model.as_ref().unwrap_or(&self.model),
            "messages": messages,
            "max_tokens": request.max_tokens.or(self.default_max_tokens).unwrap_or(4096),
        });

        if let Some(system) = system_prompt {
            body["system"] = json!(system);
        }

        if let Some(temp) = request.temperature.or(self.default_temperature) {
            body["temperature"] = json!(temp);
        }

        if let Some(stop) = &request.stop {
            body["stop_sequences"] = json!(stop);
        }

        if let Some(tools) = &request.tools {
            if !tools.is_empty() {
                body["tools"] = json!(tools
                    .iter()
                    .map(|t| {
                        json!({
                            "name": t.name,
                            "description": t.description,
                            "input_schema": t.parameters
                        })
                    })
                    .collect::<Vec<_>>());
            }
        }

        if let Some(tool_choice) = &request.tool_choice {
            body["tool_choice"] = match tool_choice {
                ToolChoice::Auto => json!({ "type": "auto" }),
                ToolChoice::None => json!({ "type": "none" }),
                ToolChoice::Required => json!({ "type": "any" }),
                ToolChoice::Tool { name } => json!({
                    "type": "tool",
                    "name": name
                }),
            };
        }

        body
    }
}

/// Convert internal messages to Anthropic format
/// Returns (system_prompt, messages)
///
/// Consecutive tool results are folded into a single user turn, which is
/// what the API expects after an assistant turn with several `tool_use` blocks.
fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<Value>) {
    let mut system_prompt = None;
    let mut converted: Vec<Value> = Vec::new();
    let mut pending_results: Vec<Value> = Vec::new();

    let flush = |pending: &mut Vec<Value>, out: &mut Vec<Value>| {
        if !pending.is_empty() {
            out.push(json!({
                "role": "user",
                "content": std::mem::take(pending)
            }));
        }
    };

    for m in messages {
        if m.role != Role::Tool {
            flush(&mut pending_results, &mut converted);
        }

        match m.role {
            Role::System => {
                system_prompt = Some(m.content.clone());
            }
            Role::User => {
                converted.push(json!({
                    "role": "user",
                    "content": m.content
                }));
            }
            Role::Assistant => match &m.tool_calls {
                Some(tool_calls) => {
                    let mut content = Vec::new();

                    if !m.content.is_empty() {
                        content.push(json!({
                            "type": "text",
                            "text": m.content
                        }));
                    }

                    for tc in tool_calls {
                        content.push(json!({
                            "type": "tool_use",
                            "id": tc.id,
                            "name": tc.name,
                            "input": tc.arguments
                        }));
                    }

                    converted.push(json!({
                        "role": "assistant",
                        "content": content
                    }));
                }
                None => {
                    converted.push(json!({
                        "role": "assistant",
                        "content": m.content
                    }));
                }
            },
            Role::Tool => {
                pending_results.push(json!({
                    "type": "tool_result",
                    "tool_use_id": m.tool_call_id.clone().unwrap_or_default(),
                    "content": m.content
                }));
            }
        }
    }
    flush(&mut pending_results, &mut converted);

    (system_prompt, converted)
}

/// Parse a response body
fn parse_response(response: AnthropicResponse) -> CompletionResponse {
    let mut content = String::new();
    let mut tool_calls = Vec::new();

    for block in response.content {
        match block.block_type.as_str() {
            "text" => {
                if let Some(text) = block.text {
                    content.push_str(&text);
                }
            }
            "tool_use" => {
                if let (Some(id), Some(name), Some(input)) = (block.id, block.name, block.input) {
                    tool_calls.push(ToolCall {
                        id,
                        name,
                        arguments: input,
                    });
                }
            }
            _ => {}
        }
    }

    let finish_reason = match response.stop_reason.as_deref() {
        Some("max_tokens") => FinishReason::Length,
        Some("tool_use") => FinishReason::ToolCalls,
        _ => FinishReason::Stop,
    };

    CompletionResponse {
        message: Message::assistant_with_tools(content, tool_calls),
        finish_reason,
        usage: Some(TokenUsage {
            prompt_tokens: response.usage.input_tokens,
            completion_tokens: response.usage.output_tokens,
            total_tokens: response.usage.input_tokens + response.usage.output_tokens,
        }),
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let body = self.build_request_body(&request);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return Err(LlmError::RateLimited { retry_after_ms });
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let anthropic_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("Failed to parse response: {}", e)))?;

        Ok(parse_response(anthropic_response))
    }
}

// Anthropic API response types

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
    id: Option<String>,
    name: Option<String>,
    input: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_results_share_one_user_turn() {
        let messages = vec![
            Message::system("sys"),
            Message::user("check this"),
            Message::assistant_with_tools(
                "",
                vec![
                    ToolCall::new("a", "math_validator", json!({"query": "1+1=3"})),
                    ToolCall::new("b", "claim_extractor", json!({"query": "x"})),
                ],
            ),
            Message::tool_result("a", &json!("2, not 3")),
            Message::tool_result("b", &json!("No erroneous claims found.")),
        ];

        let (system, converted) = convert_messages(&messages);
        assert_eq!(system.as_deref(), Some("sys"));
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[1]["content"].as_array().map(|c| c.len()), Some(2));
        let results = converted[2]["content"].as_array().cloned().unwrap_or_default();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["tool_use_id"], "a");
        assert_eq!(results[1]["content"], "No erroneous claims found.");
    }

    #[test]
    fn test_parse_tool_use_response() {
        let raw = json!({
            "content": [
                {"type": "text", "text": "Let me calculate."},
                {"type": "tool_use", "id": "toolu_1", "name": "calculator", "input": {"expression": "0.12 * 250"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 12, "output_tokens": 8}
        });
        let parsed = parse_response(serde_json::from_value(raw).unwrap());
        assert_eq!(parsed.finish_reason, FinishReason::ToolCalls);
        assert_eq!(parsed.message.content, "Let me calculate.");
        let calls = parsed.message.tool_calls.unwrap();
        assert_eq!(calls[0].name, "calculator");
        assert_eq!(parsed.usage.unwrap().total_tokens, 20);
    }
}
