//! Core agent loop
//!
//! Every agent in the system (capability agents and the supervisor) is a
//! [`ReActAgent`]: a reasoning + acting loop that calls the model, executes
//! any tools it asks for, and feeds the results back until it answers.

mod react;

pub use react::ReActAgent;

use tera::{Context, Tera};

/// Render the user prompt from a template and the caller's query
///
/// The query is available to the template as `{{query}}`. Without a
/// template, or if rendering fails, the raw query is used.
///
/// Example template: "Please solve the following problem: {{query}}"
pub fn render_prompt(prompt_template: Option<&str>, query: &str) -> String {
    match prompt_template {
        Some(template) if !template.is_empty() => {
            let mut context = Context::new();
            context.insert("query", query);

            match Tera::one_off(template, &context, false) {
                Ok(rendered) => rendered,
                Err(e) => {
                    tracing::warn!("Failed to render prompt template: {}", e);
                    query.to_string()
                }
            }
        }
        _ => query.to_string(),
    }
}
