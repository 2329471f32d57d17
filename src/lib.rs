//! # factcheck
//!
//! Multi-agent fact-checking orchestrator. A supervisor routes free text
//! (or a video caption transcript) to specialist agents and synthesizes
//! one assessment:
//!
//! - **Claim extractor**: lists erroneous claims as direct quotations
//! - **Math validator**: checks numbers with a calculator tool
//! - **Evidence checker**: issues TRUE / FALSE / PARTIALLY TRUE verdicts,
//!   backed by an external search tool provider when one is available
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use factcheck::agents::llm::create_provider;
//! use factcheck::config::Settings;
//! use factcheck::provider::ToolProviderConnector;
//! use factcheck::supervisor::Supervisor;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::default();
//!     let llm = create_provider(&settings.llm)?;
//!     let connector = ToolProviderConnector::from_config(&settings.search);
//!     let supervisor = Supervisor::from_settings(llm, connector, &settings);
//!
//!     let response = supervisor.fact_check("The Great Wall is visible from space").await;
//!     println!("{}", response);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **agents**: LLM providers, the ReAct loop, tools and capability agents
//! - **provider**: scoped sessions with the external search tool provider
//! - **supervisor**: routing, fallback to a reduced agent set, aggregation
//! - **shell**: conversation history and caption augmentation
//! - **config**: layered settings with validation

pub mod agents;
pub mod cli;
pub mod config;
pub mod provider;
pub mod shell;
pub mod supervisor;
