//! Model output, step log and task result records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TaskStatus;
use crate::action::ActionOutcome;

/// One action the model asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCall {
    #[serde(rename = "type")]
    pub action_type: String,

    #[serde(default)]
    pub params: Value,
}

impl ActionCall {
    pub fn new(action_type: impl Into<String>, params: Value) -> Self {
        Self {
            action_type: action_type.into(),
            params,
        }
    }
}

/// Structured output of one model call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOutput {
    #[serde(default)]
    pub thoughts: String,

    #[serde(default)]
    pub memory: String,

    #[serde(default)]
    pub next_goal: String,

    #[serde(default)]
    pub actions: Vec<ActionCall>,
}

/// One iteration of the step loop. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStep {
    pub idx: usize,
    pub agent_output: AgentOutput,
    pub action_outputs: Vec<ActionOutcome>,
}

/// Final result of a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub status: TaskStatus,
    pub steps: Vec<AgentStep>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agent_output_camel_case() {
        let output: AgentOutput = serde_json::from_value(json!({
            "thoughts": "look for the search box",
            "memory": "",
            "nextGoal": "type the query",
            "actions": [{"type": "clickElement", "params": {"index": 3}}]
        }))
        .unwrap();

        assert_eq!(output.next_goal, "type the query");
        assert_eq!(output.actions[0].action_type, "clickElement");
        assert_eq!(output.actions[0].params["index"], 3);

        let back = serde_json::to_value(&output).unwrap();
        assert!(back.get("nextGoal").is_some());
        assert_eq!(back["actions"][0]["type"], "clickElement");
    }

    #[test]
    fn test_agent_step_serialization() {
        let step = AgentStep {
            idx: 0,
            agent_output: AgentOutput::default(),
            action_outputs: vec![ActionOutcome::success("Scrolled down")],
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["idx"], 0);
        assert!(json.get("agentOutput").is_some());
        assert_eq!(json["actionOutputs"][0]["message"], "Scrolled down");
    }

    #[test]
    fn test_task_output_skips_missing_fields() {
        let output = TaskOutput {
            status: TaskStatus::Cancelled,
            ..Default::default()
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["status"], "cancelled");
        assert!(json.get("output").is_none());
        assert!(json.get("error").is_none());
    }
}
