//! Math validation: check numeric and statistical claims with a calculator

use async_trait::async_trait;
use std::sync::Arc;

use super::{run_once, CapabilityAgent, RunOutcome};
use crate::agents::config::{AgentConfig, AgentLimits};
use crate::agents::core::ReActAgent;
use crate::agents::llm::LlmProvider;
use crate::agents::tools::CalculatorTool;

pub const MATH_VALIDATOR: &str = "math_validator";

const DESCRIPTION: &str = "Validates mathematical claims and calculations, checks numerical \
accuracy and statistical validity, and analyzes quantitative statements for errors. Use for any \
numerical or statistical claim.";

const SYSTEM_PROMPT: &str = r#"You are a math wizard, a specialist applying mathematics across a wide variety of domains.

People need your opinion on the validity of statements they pass to you. Use the tools at your disposal to logically break down a statement to determine whether it is true or false.

Check the statement for mathematical and process errors. Use the calculator tool for every arithmetic step rather than computing in your head, and state the corrected value whenever a figure is wrong.

Your capabilities include:
1. Mathematical Operations:
   - Arithmetic calculations
   - Algebraic problem-solving
   - Geometric analysis
   - Statistical computations

2. Teaching:
   - Step-by-step problem solving
   - Formula application guidance
   - Concept breakdown

3. Financial Calculations:
   - Income tax and capital gains calculations
   - Mortgage and interest calculations

Focus on clarity and systematic problem-solving while ensuring people understand the underlying concepts.
"#;

const PROMPT_TEMPLATE: &str = "Please solve the following mathematical problem, showing all steps \
and explaining concepts clearly: {{ query }}";

const EMPTY_RESPONSE: &str = "I apologize, but I couldn't solve this mathematical problem. \
Please check if your query is clearly stated or try rephrasing it.";

const ERROR_PREFIX: &str = "Error processing your mathematical query";

/// Checks numbers; bound to the calculator tool
pub struct MathValidator {
    llm: Arc<dyn LlmProvider>,
    limits: AgentLimits,
    calculator: Arc<CalculatorTool>,
}

impl MathValidator {
    pub fn new(llm: Arc<dyn LlmProvider>, limits: AgentLimits) -> Self {
        Self {
            llm,
            limits,
            calculator: Arc::new(CalculatorTool::new()),
        }
    }

    fn build(&self) -> ReActAgent {
        let config = AgentConfig::new(MATH_VALIDATOR, DESCRIPTION, SYSTEM_PROMPT)
            .with_prompt_template(PROMPT_TEMPLATE)
            .with_agent_limits(self.limits);
        ReActAgent::new(config, self.llm.clone()).with_tools(self.calculator.clone())
    }
}

#[async_trait]
impl CapabilityAgent for MathValidator {
    fn name(&self) -> &str {
        MATH_VALIDATOR
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn invoke(&self, query: &str) -> String {
        match run_once(&self.build(), query).await {
            RunOutcome::Answer(text) => text,
            RunOutcome::Empty => EMPTY_RESPONSE.to_string(),
            RunOutcome::Failed(e) => format!("{}: {}", ERROR_PREFIX, e),
        }
    }
}
