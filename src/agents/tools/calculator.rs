//! Arithmetic tool backed by the rhai expression engine

use async_trait::async_trait;
use rhai::{Dynamic, Engine};
use serde_json::{json, Value};

use super::ToolPort;
use crate::agents::domain::ToolDefinition;

pub const CALCULATOR_TOOL: &str = "calculator";

/// Evaluates arithmetic expressions for the math validator
///
/// Integer literals are evaluated as floats so `10 / 4` gives `2.5`.
/// Only expressions are accepted: no statements, loops or assignments.
pub struct CalculatorTool {
    engine: Engine,
}

impl CalculatorTool {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_expr_depths(64, 64);
        engine.set_max_operations(10_000);
        Self { engine }
    }

    /// Evaluate one expression
    pub fn evaluate(&self, expression: &str) -> anyhow::Result<f64> {
        let source = promote_integers(expression);
        let result: Dynamic = self
            .engine
            .eval_expression(&source)
            .map_err(|e| anyhow::anyhow!("Invalid expression '{}': {}", expression, e))?;

        let value = if let Ok(f) = result.as_float() {
            f
        } else if let Ok(i) = result.as_int() {
            i as f64
        } else {
            anyhow::bail!(
                "Expression '{}' did not produce a number (got {})",
                expression,
                result.type_name()
            );
        };

        if !value.is_finite() {
            anyhow::bail!("Expression '{}' is not a finite number", expression);
        }
        Ok(value)
    }
}

impl Default for CalculatorTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite bare integer literals (`12`) as float literals (`12.0`)
fn promote_integers(expression: &str) -> String {
    let chars: Vec<char> = expression.chars().collect();
    let mut out = String::with_capacity(expression.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let starts_literal = c.is_ascii_digit()
            && (i == 0 || !(chars[i - 1].is_alphanumeric() || chars[i - 1] == '_' || chars[i - 1] == '.'));

        if !starts_literal {
            out.push(c);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '_') {
            i += 1;
        }
        out.extend(&chars[start..i]);

        let followed_by_fraction = i < chars.len() && chars[i] == '.';
        if !followed_by_fraction {
            out.push_str(".0");
        }
    }

    out
}

#[async_trait]
impl ToolPort for CalculatorTool {
    async fn execute_tool(&self, name: &str, args: Value) -> anyhow::Result<Value> {
        if name != CALCULATOR_TOOL {
            anyhow::bail!("Tool not found: {}", name);
        }

        let expression = args
            .get("expression")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Missing required argument: expression"))?;

        let result = self.evaluate(expression)?;
        Ok(json!({ "expression": expression, "result": result }))
    }

    async fn list_tools(&self) -> anyhow::Result<Vec<ToolDefinition>> {
        Ok(vec![ToolDefinition::new(
            CALCULATOR_TOOL,
            "Evaluate an arithmetic expression. Supports + - * / % ** and parentheses, \
             plus functions such as sqrt, abs, floor, ceil, round, ln and log.",
            json!({
                "type": "object",
                "properties": {
                    "expression": {
                        "type": "string",
                        "description": "The expression to evaluate, e.g. \"(0.12 * 250) + 4\""
                    }
                },
                "required": ["expression"]
            }),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promote_integers() {
        assert_eq!(promote_integers("10 / 4"), "10.0 / 4.0");
        assert_eq!(promote_integers("1.5 * 2"), "1.5 * 2.0");
        assert_eq!(promote_integers("sqrt(16)"), "sqrt(16.0)");
        assert_eq!(promote_integers("1e3"), "1.0e3");
        assert_eq!(promote_integers("log10(100)"), "log10(100.0)");
    }

    #[test]
    fn test_evaluate() {
        let calc = CalculatorTool::new();
        assert_eq!(calc.evaluate("10 / 4").unwrap(), 2.5);
        assert_eq!(calc.evaluate("0.12 * 250").unwrap(), 30.0);
        assert_eq!(calc.evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(calc.evaluate("sqrt(16)").unwrap(), 4.0);
    }

    #[test]
    fn test_rejects_non_numeric() {
        let calc = CalculatorTool::new();
        assert!(calc.evaluate("\"hello\"").is_err());
        assert!(calc.evaluate("1 +").is_err());
        assert!(calc.evaluate("1 / 0").is_err());
    }

    #[tokio::test]
    async fn test_missing_expression_argument() {
        let calc = CalculatorTool::new();
        let err = calc.execute_tool(CALCULATOR_TOOL, json!({})).await.unwrap_err();
        assert!(err.to_string().contains("expression"));
    }
}
