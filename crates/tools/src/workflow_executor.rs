//! Workflow executor: deterministic calculations the agents delegate to.
//!
//! One tool with a `workflow` discriminator rather than one tool per
//! operation, so both domain agents share a single tool definition.

use async_trait::async_trait;
use policydesk_core::error::ToolError;
use policydesk_core::tool::{Tool, ToolResult};
use serde::Deserialize;
use tracing::debug;

use crate::expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `value <= limit` (income under a threshold)
    #[default]
    AtMost,
    /// `value >= limit`
    AtLeast,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "workflow", rename_all = "snake_case")]
pub enum Workflow {
    Calculate {
        expression: String,
    },
    Percentage {
        value: f64,
        percent: f64,
    },
    ThresholdCheck {
        value: f64,
        limit: f64,
        #[serde(default)]
        comparison: Comparison,
    },
}

pub struct WorkflowExecutorTool;

#[async_trait]
impl Tool for WorkflowExecutorTool {
    fn name(&self) -> &str {
        "workflow_executor"
    }

    fn description(&self) -> &str {
        "Run a deterministic workflow. 'calculate' evaluates an arithmetic expression \
         (+, -, *, /, parentheses). 'percentage' computes percent of a value. \
         'threshold_check' compares a value against a limit, e.g. income against an \
         eligibility threshold."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "workflow": {
                    "type": "string",
                    "enum": ["calculate", "percentage", "threshold_check"],
                    "description": "Which workflow to run"
                },
                "expression": {
                    "type": "string",
                    "description": "For 'calculate': the expression, e.g. '(50000 - 12000) * 0.25'"
                },
                "value": {
                    "type": "number",
                    "description": "For 'percentage' and 'threshold_check': the input value"
                },
                "percent": {
                    "type": "number",
                    "description": "For 'percentage': the percent to take, e.g. 2.5"
                },
                "limit": {
                    "type": "number",
                    "description": "For 'threshold_check': the threshold to compare against"
                },
                "comparison": {
                    "type": "string",
                    "enum": ["at_most", "at_least"],
                    "description": "For 'threshold_check': pass when value is at most (default) or at least the limit"
                }
            },
            "required": ["workflow"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let workflow: Workflow = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        debug!(?workflow, "Running workflow");

        Ok(run(&workflow))
    }
}

fn run(workflow: &Workflow) -> ToolResult {
    match workflow {
        Workflow::Calculate { expression } => match expression::evaluate(expression) {
            Ok(value) => success(format_number(value), serde_json::json!({ "result": value })),
            Err(e) => ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Error: {e}"),
                data: None,
            },
        },
        Workflow::Percentage { value, percent } => {
            let result = value * percent / 100.0;
            success(format_number(result), serde_json::json!({ "result": result }))
        }
        Workflow::ThresholdCheck {
            value,
            limit,
            comparison,
        } => {
            let passes = match comparison {
                Comparison::AtMost => value <= limit,
                Comparison::AtLeast => value >= limit,
            };
            let difference = limit - value;
            let output = format!(
                "{} (value {}, limit {}, difference {})",
                if passes { "PASS" } else { "FAIL" },
                format_number(*value),
                format_number(*limit),
                format_number(difference),
            );
            success(
                output,
                serde_json::json!({ "passes": passes, "difference": difference }),
            )
        }
    }
}

fn success(output: String, data: serde_json::Value) -> ToolResult {
    ToolResult {
        call_id: String::new(),
        success: true,
        output,
        data: Some(data),
    }
}

/// Drop the trailing `.0` on whole numbers.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn exec(args: serde_json::Value) -> Result<ToolResult, ToolError> {
        WorkflowExecutorTool.execute(args).await
    }

    #[tokio::test]
    async fn calculate_formats_integers_and_decimals() {
        let r = exec(json!({"workflow": "calculate", "expression": "10 / 2"})).await.unwrap();
        assert!(r.success);
        assert_eq!(r.output, "5");

        let r = exec(json!({"workflow": "calculate", "expression": "10 / 3"})).await.unwrap();
        assert!(r.output.starts_with("3.333"));
    }

    #[tokio::test]
    async fn calculate_error_is_unsuccessful_result() {
        let r = exec(json!({"workflow": "calculate", "expression": "1 / 0"})).await.unwrap();
        assert!(!r.success);
        assert_eq!(r.output, "Error: Division by zero");
    }

    #[tokio::test]
    async fn percentage() {
        let r = exec(json!({"workflow": "percentage", "value": 40000, "percent": 2.5}))
            .await
            .unwrap();
        assert_eq!(r.output, "1000");
        assert_eq!(r.data.unwrap()["result"], json!(1000.0));
    }

    #[tokio::test]
    async fn threshold_check_defaults_to_at_most() {
        let r = exec(json!({"workflow": "threshold_check", "value": 18000, "limit": 20783}))
            .await
            .unwrap();
        let data = r.data.unwrap();
        assert_eq!(data["passes"], json!(true));
        assert_eq!(data["difference"], json!(2783.0));
        assert!(r.output.starts_with("PASS"));
    }

    #[tokio::test]
    async fn threshold_check_at_least() {
        let r = exec(json!({
            "workflow": "threshold_check",
            "value": 18000,
            "limit": 20783,
            "comparison": "at_least"
        }))
        .await
        .unwrap();
        assert_eq!(r.data.unwrap()["passes"], json!(false));
        assert!(r.output.starts_with("FAIL"));
    }

    #[tokio::test]
    async fn unknown_workflow_or_missing_args_are_invalid() {
        assert!(matches!(
            exec(json!({"workflow": "wire_transfer"})).await,
            Err(ToolError::InvalidArguments(_))
        ));
        assert!(matches!(
            exec(json!({"workflow": "percentage", "value": 10})).await,
            Err(ToolError::InvalidArguments(_))
        ));
        assert!(matches!(exec(json!({})).await, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn definition_lists_workflows() {
        let def = WorkflowExecutorTool.to_definition();
        assert_eq!(def.name, "workflow_executor");
        assert_eq!(def.parameters["properties"]["workflow"]["enum"][2], "threshold_check");
    }
}
