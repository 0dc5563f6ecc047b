//! Action trait definition.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ActionContext, ActionDefinition, ActionOutcome};
use crate::error::ActionError;

/// An executable unit the model can choose by type name.
#[async_trait]
pub trait Action: Send + Sync {
    fn definition(&self) -> &ActionDefinition;

    /// Run the action. Errors are turned into failed outcomes by the dispatcher.
    async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError>;

    fn action_type(&self) -> &str {
        &self.definition().action_type
    }

    /// Human readable rendering of one call, if the action has one.
    fn pprint(&self, _params: &Value) -> Option<String> {
        None
    }

    /// Task output produced when this action completes a task.
    fn complete(&self, _params: &Value) -> Option<String> {
        None
    }

    fn validate(&self, params: &Value) -> Result<(), ActionError> {
        let schema = &self.definition().params_schema;
        if schema.get("type") == Some(&serde_json::json!("object")) && !params.is_object() {
            return Err(ActionError::InvalidParameters(
                "Parameters must be an object".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deserialize action params into a typed struct.
pub fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, ActionError> {
    serde_json::from_value(params).map_err(|e| ActionError::InvalidParameters(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    struct EchoAction {
        definition: ActionDefinition,
    }

    impl EchoAction {
        fn new() -> Self {
            Self {
                definition: ActionDefinition::new("echo", "Echo the text").with_params_schema(
                    serde_json::json!({"type": "object", "properties": {"text": {"type": "string"}}}),
                ),
            }
        }
    }

    #[async_trait]
    impl Action for EchoAction {
        fn definition(&self) -> &ActionDefinition {
            &self.definition
        }

        async fn run(
            &self,
            params: Value,
            _ctx: &ActionContext,
        ) -> Result<ActionOutcome, ActionError> {
            Ok(ActionOutcome::success(params.to_string()))
        }
    }

    #[derive(Debug, Deserialize)]
    struct IndexParams {
        index: u32,
    }

    #[test]
    fn test_action_type_from_definition() {
        let action = EchoAction::new();
        assert_eq!(action.action_type(), "echo");
        assert!(action.pprint(&serde_json::json!({})).is_none());
        assert!(action.complete(&serde_json::json!({})).is_none());
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let action = EchoAction::new();
        assert!(action.validate(&serde_json::json!({"text": "a"})).is_ok());
        let err = action.validate(&serde_json::json!("a")).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn test_parse_params() {
        let parsed: IndexParams = parse_params(serde_json::json!({"index": 7})).unwrap();
        assert_eq!(parsed.index, 7);

        let err = parse_params::<IndexParams>(serde_json::json!({"idx": 7})).unwrap_err();
        assert!(matches!(err, ActionError::InvalidParameters(_)));
    }
}
