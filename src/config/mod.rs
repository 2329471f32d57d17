use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub mod validator;

use crate::agents::config::{AgentLimits, LlmProviderConfig};
use crate::cli::Cli;

/// Environment variable prefix; nested keys use `__` (`FACTCHECK__LLM__MODEL`)
pub const ENV_PREFIX: &str = "FACTCHECK";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmProviderConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// Limits for each capability agent call
    #[serde(default)]
    pub agents: AgentLimits,
    /// Limits for the supervisor run as a whole
    #[serde(default = "default_supervisor_limits")]
    pub supervisor: AgentLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmProviderConfig::default(),
            search: SearchConfig::default(),
            agents: AgentLimits::default(),
            supervisor: default_supervisor_limits(),
        }
    }
}

fn default_supervisor_limits() -> AgentLimits {
    AgentLimits::new(15, 300)
}

/// External search tool provider, launched as a child process that speaks
/// MCP over stdio
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Whether to try the search provider at all
    pub enabled: bool,
    /// Program to launch
    pub command: String,
    /// Arguments for the program
    pub args: Vec<String>,
    /// Extra environment for the child process
    pub env: HashMap<String, String>,
    /// Upper bound on launching the provider and listing its tools
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "uvx".to_string(),
            args: vec!["duckduckgo-mcp-server".to_string()],
            env: HashMap::new(),
            timeout_seconds: 30,
        }
    }
}

impl Settings {
    /// Create settings from CLI arguments (config file, environment and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings: Settings = Self::builder(&cli.config)?.build()?.try_deserialize()?;

        // Apply CLI overrides (CLI > env vars > config file)
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a config file (missing files are allowed) and the environment
    pub fn from_path(config_path: &Path) -> Result<Self, anyhow::Error> {
        let settings: Settings = Self::builder(config_path)?.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn builder(config_path: &Path) -> Result<ConfigBuilder<DefaultState>, anyhow::Error> {
        let builder = Config::builder()
            .set_default("llm.provider", "anthropic")?
            .set_default("llm.model", "claude-3-5-haiku-20241022")?
            .set_default("search.enabled", true)?
            .set_default("search.command", "uvx")?
            .set_default("search.args", vec!["duckduckgo-mcp-server"])?
            .set_default("search.timeout_seconds", 30)?
            .set_default("agents.max_iterations", 10)?
            .set_default("agents.timeout_seconds", 60)?
            .set_default("supervisor.max_iterations", 15)?
            .set_default("supervisor.timeout_seconds", 300)?
            .add_source(File::from(config_path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        Ok(builder)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(model) = &cli.model {
            self.llm.model = model.clone();
        }
        if cli.no_search {
            self.search.enabled = false;
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }
}
