//! Actions that only record the model's reasoning.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use webhands_protocols::{
    Action, ActionContext, ActionDefinition, ActionError, ActionOutcome, parse_params,
};

#[derive(Debug, Deserialize)]
struct ThinkParams {
    thought: String,
}

/// Lets the model write down a plan without touching the page.
pub struct ThinkAction {
    definition: ActionDefinition,
}

impl ThinkAction {
    pub fn new() -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "thought": {
                    "type": "string",
                    "description": "A thought or plan about the next steps to take."
                }
            },
            "required": ["thought"],
            "additionalProperties": false
        });

        Self {
            definition: ActionDefinition::new(
                "thinkAction",
                "A simple thought process about your next steps. You can use this action to think about what to do next. Use it when the task is not straightforward.",
            )
            .with_params_schema(schema),
        }
    }
}

impl Default for ThinkAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for ThinkAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, _ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: ThinkParams = parse_params(params)?;
        Ok(ActionOutcome::success(format!(
            "A simple thought process about your next steps. You thought about: {}",
            params.thought
        )))
    }

    fn pprint(&self, params: &Value) -> Option<String> {
        let thought = params.get("thought")?.as_str()?;
        Some(format!("Think about: \"{}\"", thought))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Criterion {
    sub_task: String,
    sub_task_satisfied: bool,
    #[allow(dead_code)]
    #[serde(default)]
    sub_task_satisfied_reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationParams {
    task: String,
    completion_criteria: Vec<Criterion>,
}

/// A self-check the model runs before issuing `complete`.
pub struct TaskCompleteValidationAction {
    definition: ActionDefinition,
}

impl TaskCompleteValidationAction {
    pub fn new() -> Self {
        let schema = json!({
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": "The original task."
                },
                "completionCriteria": {
                    "type": "array",
                    "description": "Every sub part of the task and whether it is done.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "subTask": {
                                "type": "string",
                                "description": "A sub part of the task."
                            },
                            "subTaskSatisfied": {
                                "type": "boolean",
                                "description": "Whether this sub part is completed."
                            },
                            "subTaskSatisfiedReason": {
                                "type": "string",
                                "description": "Why the sub part is or is not completed."
                            }
                        },
                        "required": ["subTask", "subTaskSatisfied", "subTaskSatisfiedReason"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["task", "completionCriteria"],
            "additionalProperties": false
        });

        Self {
            definition: ActionDefinition::new(
                "taskCompleteValidation",
                "Must run this before issuing the final complete action to validate that the task is completed. Evaluate if all the sub parts of the task are completed. If any sub part is not satisfied, keep working on it instead of completing.",
            )
            .with_params_schema(schema),
        }
    }
}

impl Default for TaskCompleteValidationAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Action for TaskCompleteValidationAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, _ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let params: ValidationParams = parse_params(params)?;
        let lines: Vec<String> = params
            .completion_criteria
            .iter()
            .map(|c| {
                format!(
                    "subTask:{} || condition satisfied: {}",
                    c.sub_task, c.sub_task_satisfied
                )
            })
            .collect();

        Ok(ActionOutcome::success(format!(
            "Task Completion Report: \ntask:{} \nsubtasks: \n{}",
            params.task,
            lines.join("\n")
        )))
    }
}
