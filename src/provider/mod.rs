//! Tool-provider connector
//!
//! Owns the lifecycle of connections to the external search provider. A
//! connection only exists inside [`ToolProviderConnector::scoped`]: it is
//! launched on entry, its tools are listed, the caller's work runs, and the
//! connection is closed on every exit path, including errors and panics.

mod stdio;

pub use stdio::StdioLauncher;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::agents::domain::ToolDefinition;
use crate::agents::tools::ToolPort;
use crate::config::SearchConfig;

/// How to launch the provider process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolProviderDescriptor {
    pub command: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl ToolProviderDescriptor {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            env: Vec::new(),
        }
    }

    /// Check that the descriptor can be launched at all
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.command.trim().is_empty() {
            anyhow::bail!("Tool provider command must not be empty");
        }
        if self.args.iter().any(|a| a.contains('\0')) {
            anyhow::bail!("Tool provider arguments must not contain NUL bytes");
        }
        Ok(())
    }
}

impl From<&SearchConfig> for ToolProviderDescriptor {
    fn from(config: &SearchConfig) -> Self {
        let mut env: Vec<(String, String)> = config
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        env.sort();

        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            env,
        }
    }
}

impl std::fmt::Display for ToolProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A live connection to a tool provider
#[async_trait]
pub trait ProviderSession: Send + Sync {
    async fn list_tools(&self) -> anyhow::Result<Vec<ToolDefinition>>;
    async fn call_tool(&self, name: &str, args: Value) -> anyhow::Result<Value>;
    /// Tear the connection down. Must be safe to call more than once.
    async fn close(&self) -> anyhow::Result<()>;
}

/// Opens provider sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Human-readable description of what gets launched
    fn describe(&self) -> String;
    async fn launch(&self) -> anyhow::Result<Arc<dyn ProviderSession>>;
}

/// Hands out scoped sessions to the search provider
///
/// Cloning is cheap and clones share the launcher, but never a session:
/// every call to [`scoped`](Self::scoped) opens its own.
#[derive(Clone)]
pub struct ToolProviderConnector {
    launcher: Arc<dyn SessionLauncher>,
    timeout: Duration,
}

impl ToolProviderConnector {
    /// Connector for a child process described by `descriptor`
    pub fn new(descriptor: ToolProviderDescriptor, timeout: Duration) -> anyhow::Result<Self> {
        descriptor.validate()?;
        Ok(Self::with_launcher(Arc::new(StdioLauncher::new(descriptor)), timeout))
    }

    /// Connector over an arbitrary launcher
    pub fn with_launcher(launcher: Arc<dyn SessionLauncher>, timeout: Duration) -> Self {
        Self { launcher, timeout }
    }

    /// Build the connector from settings
    ///
    /// Returns `None` (after logging a warning) when search is disabled or the
    /// descriptor is unusable; callers then run without external search.
    pub fn from_config(config: &SearchConfig) -> Option<Self> {
        if !config.enabled {
            warn!("External search is disabled; fact-checking will use general knowledge only");
            return None;
        }

        let descriptor = ToolProviderDescriptor::from(config);
        match Self::new(descriptor, Duration::from_secs(config.timeout_seconds)) {
            Ok(connector) => {
                info!(provider = %connector.launcher.describe(), "Search tool provider configured");
                Some(connector)
            }
            Err(e) => {
                warn!("Failed to create search tool provider client: {}", e);
                None
            }
        }
    }

    pub fn describe(&self) -> String {
        self.launcher.describe()
    }

    /// Run `f` with the tools of a freshly launched session
    ///
    /// Launching and listing are bounded by the connector timeout. The
    /// session is closed before this returns, whatever `f` did; a panic
    /// inside `f` is turned into an error.
    pub async fn scoped<F, Fut, T>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(Arc<dyn ToolPort>) -> Fut + Send,
        Fut: Future<Output = anyhow::Result<T>> + Send,
    {
        let secs = self.timeout.as_secs();
        let session = tokio::time::timeout(self.timeout, self.launcher.launch())
            .await
            .map_err(|_| anyhow::anyhow!("Timed out after {}s launching tool provider", secs))??;
        debug!(provider = %self.launcher.describe(), "Tool provider session opened");

        let outcome = AssertUnwindSafe(async {
            let tools = tokio::time::timeout(self.timeout, session.list_tools())
                .await
                .map_err(|_| anyhow::anyhow!("Timed out after {}s listing provider tools", secs))??;
            info!(count = tools.len(), "Tool provider session ready");

            let port: Arc<dyn ToolPort> = Arc::new(SessionToolPort::new(session.clone(), tools));
            f(port).await
        })
        .catch_unwind()
        .await;

        if let Err(e) = session.close().await {
            warn!("Failed to close tool provider session: {}", e);
        } else {
            debug!("Tool provider session closed");
        }

        match outcome {
            Ok(result) => result,
            Err(panic) => Err(anyhow::anyhow!(
                "Tool provider scope panicked: {}",
                panic_message(panic.as_ref())
            )),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Exposes an open session's tools to an agent
struct SessionToolPort {
    session: Arc<dyn ProviderSession>,
    tools: Vec<ToolDefinition>,
}

impl SessionToolPort {
    fn new(session: Arc<dyn ProviderSession>, tools: Vec<ToolDefinition>) -> Self {
        Self { session, tools }
    }
}

#[async_trait]
impl ToolPort for SessionToolPort {
    async fn execute_tool(&self, name: &str, args: Value) -> anyhow::Result<Value> {
        if !self.tools.iter().any(|t| t.name == name) {
            anyhow::bail!("Tool not found: {}", name);
        }
        self.session.call_tool(name, args).await
    }

    async fn list_tools(&self) -> anyhow::Result<Vec<ToolDefinition>> {
        Ok(self.tools.clone())
    }
}
