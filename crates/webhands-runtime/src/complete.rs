//! The reserved `complete` action and its output-schema variant.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use webhands_protocols::action::{
    Action, ActionContext, ActionDefinition, ActionOutcome, COMPLETE_ACTION, parse_params,
};
use webhands_protocols::error::ActionError;

/// Output used when the model completes without any text.
pub const NO_RESPONSE_TEXT: &str = "No response text found";

#[derive(Debug, Deserialize)]
struct CompleteParams {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    text: Option<String>,
}

/// Ends the task with a free-text answer.
pub struct CompleteAction {
    definition: ActionDefinition,
}

impl CompleteAction {
    pub fn new() -> Self {
        let definition = ActionDefinition::new(
            COMPLETE_ACTION,
            "Complete the task, this must be the final action in the sequence",
        )
        .with_params_schema(json!({
            "type": "object",
            "properties": {
                "success": {
                    "type": "boolean",
                    "description": "Whether the task was completed successfully."
                },
                "text": {
                    "type": ["string", "null"],
                    "description": "The final answer to the goal. Include every piece of information the task asked for, in explicit detail."
                }
            },
            "required": ["success", "text"],
            "additionalProperties": false
        }));
        Self { definition }
    }
}

impl Default for CompleteAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for CompleteAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, _params: Value, _ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        Ok(ActionOutcome::success("Task Complete"))
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        let params: CompleteParams = serde_json::from_value(params.clone()).ok()?;
        Some(format!(
            "Complete task with {}",
            if params.success { "success" } else { "failure" }
        ))
    }

    fn complete(&self, params: &Value) -> Option<String> {
        let text = serde_json::from_value::<CompleteParams>(params.clone())
            .ok()
            .and_then(|p| p.text);
        Some(text.unwrap_or_else(|| NO_RESPONSE_TEXT.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuredCompleteParams {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    output_schema: Value,
}

/// Ends the task with a JSON object shaped by a caller-provided schema.
pub struct StructuredCompleteAction {
    definition: ActionDefinition,
}

impl StructuredCompleteAction {
    pub fn new(output_schema: Value) -> Self {
        let definition = ActionDefinition::new(
            COMPLETE_ACTION,
            "Complete the task. An output schema has been provided to you. Try your best to provide your response so that it fits the output schema provided.",
        )
        .with_params_schema(json!({
            "type": "object",
            "properties": {
                "success": {
                    "type": "boolean",
                    "description": "Whether the task was completed successfully."
                },
                "outputSchema": {
                    "anyOf": [output_schema, {"type": "null"}],
                    "description": "The final response, fitted into the given schema."
                }
            },
            "required": ["success", "outputSchema"],
            "additionalProperties": false
        }));
        Self { definition }
    }
}

#[async_trait]
impl Action for StructuredCompleteAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, _ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: StructuredCompleteParams = parse_params(params)?;
        if params.success && !params.output_schema.is_null() {
            Ok(ActionOutcome::success("The action generated an object")
                .with_extract(params.output_schema))
        } else {
            Ok(ActionOutcome::failure(
                "Could not complete task and/or could not extract response into output schema.",
            ))
        }
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        let success = params.get("success").and_then(Value::as_bool).unwrap_or(false);
        Some(format!(
            "Complete task with {}",
            if success { "success" } else { "failure" }
        ))
    }

    fn complete(&self, params: &Value) -> Option<String> {
        let output = params.get("outputSchema").cloned().unwrap_or(Value::Null);
        serde_json::to_string_pretty(&output).ok()
    }
}
