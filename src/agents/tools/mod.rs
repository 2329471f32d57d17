//! Tools agents can call
//!
//! A [`ToolPort`] is anything that can list and execute tools: the built-in
//! calculator, a live search session, or the capability agents themselves
//! when they are handed to the supervisor.

mod calculator;

pub use calculator::{CalculatorTool, CALCULATOR_TOOL};

use async_trait::async_trait;
use serde_json::Value;

use crate::agents::domain::ToolDefinition;

/// A source of callable tools
#[async_trait]
pub trait ToolPort: Send + Sync {
    async fn execute_tool(&self, name: &str, args: Value) -> anyhow::Result<Value>;
    async fn list_tools(&self) -> anyhow::Result<Vec<ToolDefinition>>;
}
