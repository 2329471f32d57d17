//! Agent and supervisor response types

use serde::{Deserialize, Serialize};

use super::{Role, ToolCallResult};

/// Final response from an agent run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Final assistant text
    pub content: String,
    /// Tool calls made during execution (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallResult>,
    /// Intermediate text the model produced alongside tool calls
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasoning_steps: Vec<String>,
    /// Number of completion rounds
    #[serde(default)]
    pub iterations: u32,
    /// Token usage information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl AgentResponse {
    /// Whether the named tool was called at least once
    pub fn called_tool(&self, name: &str) -> bool {
        self.tool_calls.iter().any(|c| c.tool_name == name)
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens used in the prompt/input
    pub prompt_tokens: u32,
    /// Tokens generated in the response
    pub completion_tokens: u32,
    /// Total tokens used
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Add another usage record to this one
    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// One block of structured message content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Block type, `text` for everything the supervisor produces
    #[serde(rename = "type")]
    pub block_type: String,
    /// Text of the block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentBlock {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            block_type: "text".to_string(),
            text: Some(text.into()),
        }
    }
}

/// Message carried by a structured response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

/// Structured supervisor result: `message.content[0].text` holds the answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredResponse {
    pub message: ResponseMessage,
}

impl StructuredResponse {
    /// Wrap an assistant answer
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            message: ResponseMessage {
                role: Role::Assistant,
                content: vec![ContentBlock::text(text)],
            },
        }
    }
}

/// What a fact-check returns to its caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FactCheckResponse {
    /// Plain text answer (error strings and fixed fallbacks)
    PlainText(String),
    /// Synthesized answer from the supervisor model
    Structured(StructuredResponse),
}

impl FactCheckResponse {
    /// Extract the answer text
    ///
    /// Structured responses yield their first content block's text; when that
    /// is missing the whole response is stringified instead.
    pub fn text(&self) -> String {
        match self {
            FactCheckResponse::PlainText(text) => text.clone(),
            FactCheckResponse::Structured(structured) => structured
                .message
                .content
                .first()
                .and_then(|block| block.text.clone())
                .unwrap_or_else(|| {
                    serde_json::to_string(structured).unwrap_or_else(|_| format!("{:?}", structured))
                }),
        }
    }

    /// Whether this response carries an error message
    pub fn is_error(&self) -> bool {
        matches!(self, FactCheckResponse::PlainText(text) if text.starts_with("Error"))
    }
}

impl std::fmt::Display for FactCheckResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}
