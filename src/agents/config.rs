//! Configuration types for agents and LLM providers

use serde::{Deserialize, Serialize};

/// Configuration for a single agent run
///
/// Capability agents and the supervisor build one of these per invocation;
/// nothing in it outlives the call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Unique agent name
    pub name: String,
    /// Human-readable description (also used as the tool description when
    /// the agent is exposed to the supervisor)
    pub description: String,
    /// System prompt for the agent
    pub system_prompt: String,
    /// Tera template turning the caller's query into the user message.
    /// The query is available as `{{query}}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
    /// Maximum reasoning iterations
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Temperature override (if not set, uses LLM config default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Max tokens override (if not set, uses LLM config default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl AgentConfig {
    /// Create a config with default limits
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            prompt_template: None,
            max_iterations: default_max_iterations(),
            timeout_seconds: default_timeout(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the prompt template
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    /// Set iteration and timeout limits
    pub fn with_limits(mut self, max_iterations: u32, timeout_seconds: u64) -> Self {
        self.max_iterations = max_iterations;
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Apply a set of limits
    pub fn with_agent_limits(self, limits: AgentLimits) -> Self {
        self.with_limits(limits.max_iterations, limits.timeout_seconds)
    }
}

/// Iteration and time bounds applied to a family of agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentLimits {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl AgentLimits {
    pub fn new(max_iterations: u32, timeout_seconds: u64) -> Self {
        Self {
            max_iterations,
            timeout_seconds,
        }
    }
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self::new(default_max_iterations(), default_timeout())
    }
}

pub(crate) fn default_max_iterations() -> u32 {
    10
}

pub(crate) fn default_timeout() -> u64 {
    60
}

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmProviderConfig {
    /// Provider type
    #[serde(default)]
    pub provider: LlmProviderType,
    /// Model name/identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable containing the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Custom base URL (for self-hosted or proxied endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Default temperature for completions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Default max tokens for completions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderType::default(),
            model: default_model(),
            api_key_env: None,
            base_url: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

fn default_model() -> String {
    "claude-3-5-haiku-20241022".to_string()
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// Anthropic Messages API
    #[default]
    Anthropic,
    /// OpenAI chat completions (or any compatible endpoint)
    OpenAI,
}

impl std::fmt::Display for LlmProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProviderType::Anthropic => write!(f, "anthropic"),
            LlmProviderType::OpenAI => write!(f, "openai"),
        }
    }
}
