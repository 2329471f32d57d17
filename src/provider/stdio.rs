//! Child-process launcher speaking MCP over stdio (rmcp client)

use async_trait::async_trait;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
};
use rmcp::service::{Peer, RunningService};
use rmcp::transport::TokioChildProcess;
use rmcp::{RoleClient, ServiceExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{ProviderSession, SessionLauncher, ToolProviderDescriptor};
use crate::agents::domain::ToolDefinition;

/// Launches the provider as a child process
pub struct StdioLauncher {
    descriptor: ToolProviderDescriptor,
}

impl StdioLauncher {
    pub fn new(descriptor: ToolProviderDescriptor) -> Self {
        Self { descriptor }
    }

    fn client_info() -> ClientInfo {
        ClientInfo {
            protocol_version: Default::default(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
                icons: None,
            },
        }
    }
}

#[async_trait]
impl SessionLauncher for StdioLauncher {
    fn describe(&self) -> String {
        self.descriptor.to_string()
    }

    async fn launch(&self) -> anyhow::Result<Arc<dyn ProviderSession>> {
        let mut command = Command::new(&self.descriptor.command);
        command.args(&self.descriptor.args);
        for (key, value) in &self.descriptor.env {
            command.env(key, value);
        }

        info!(provider = %self.descriptor, "Launching tool provider");
        let transport = TokioChildProcess::new(command).map_err(|e| {
            anyhow::anyhow!("Failed to spawn tool provider '{}': {}", self.descriptor, e)
        })?;

        let service = Self::client_info().serve(transport).await.map_err(|e| {
            anyhow::anyhow!("Failed to initialize tool provider '{}': {}", self.descriptor, e)
        })?;

        if let Some(info) = service.peer_info() {
            debug!(server = %info.server_info.name, "Tool provider initialized");
        }

        Ok(Arc::new(StdioSession::new(service)))
    }
}

/// An initialized MCP client session over a child process
struct StdioSession {
    peer: Peer<RoleClient>,
    service: Mutex<Option<RunningService<RoleClient, ClientInfo>>>,
}

impl StdioSession {
    fn new(service: RunningService<RoleClient, ClientInfo>) -> Self {
        Self {
            peer: service.peer().clone(),
            service: Mutex::new(Some(service)),
        }
    }
}

#[async_trait]
impl ProviderSession for StdioSession {
    async fn list_tools(&self) -> anyhow::Result<Vec<ToolDefinition>> {
        let result = self.peer.list_tools(Default::default()).await?;

        Ok(result
            .tools
            .into_iter()
            .map(|tool| {
                ToolDefinition::new(
                    tool.name.to_string(),
                    tool.description.map(|d| d.to_string()).unwrap_or_default(),
                    Value::Object((*tool.input_schema).clone()),
                )
            })
            .collect())
    }

    async fn call_tool(&self, name: &str, args: Value) -> anyhow::Result<Value> {
        let arguments = match args {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => anyhow::bail!("Tool arguments must be an object, got {}", other),
        };

        let result = self
            .peer
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments,
            })
            .await?;

        tool_output(result)
    }

    async fn close(&self) -> anyhow::Result<()> {
        let Some(service) = self.service.lock().await.take() else {
            return Ok(());
        };
        service
            .cancel()
            .await
            .map_err(|e| anyhow::anyhow!("Tool provider shutdown failed: {}", e))?;
        Ok(())
    }
}

/// Flatten a tool result into the value handed back to the model
fn tool_output(result: CallToolResult) -> anyhow::Result<Value> {
    let mut output = String::new();
    for content in &result.content {
        if let Some(text) = content.as_text() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&text.text);
        }
    }

    if result.is_error.unwrap_or(false) {
        anyhow::bail!("Tool provider returned an error: {}", output);
    }

    if let Some(structured) = result.structured_content {
        return Ok(structured);
    }

    // Try to parse as JSON, otherwise return as string
    match serde_json::from_str::<Value>(&output) {
        Ok(json_value) => Ok(json_value),
        Err(_) => Ok(Value::String(output)),
    }
}
