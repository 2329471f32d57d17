//! Agent building blocks
//!
//! - `domain/` - Messages, tool calls and responses
//! - `llm/` - LLM provider trait with Anthropic and OpenAI implementations
//! - `core/` - ReAct reasoning loop shared by every agent
//! - `tools/` - Tool port abstraction and the calculator tool
//! - `capability/` - Specialist agents the supervisor routes to

pub mod capability;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod llm;
pub mod tools;

// Re-export commonly used types
pub use config::*;
pub use domain::*;
pub use error::*;
