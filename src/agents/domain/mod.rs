//! Domain types for the agent system
//!
//! Messages exchanged with LLM providers, tool calls, and the responses
//! agents and the supervisor hand back to callers.

mod message;
mod response;
mod tool_call;

pub use message::*;
pub use response::*;
pub use tool_call::*;
