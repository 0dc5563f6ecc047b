//! Actions backed by MCP tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use webhands_protocols::{
    Action, ActionContext, ActionDefinition, ActionError, ActionOutcome, parse_params,
};

use crate::client::McpClient;
use crate::protocol::McpToolDefinition;

/// One MCP tool exposed as an agent action.
///
/// The model passes the tool arguments as a JSON string in `params`.
pub struct McpToolAction {
    definition: ActionDefinition,
    client: Arc<McpClient>,
}

#[derive(Debug, Deserialize)]
struct ToolParams {
    params: String,
}

impl McpToolAction {
    pub fn new(tool: McpToolDefinition, client: Arc<McpClient>) -> Self {
        let schema = serde_json::to_string(&tool.input_schema).unwrap_or_default();
        let definition =
            ActionDefinition::new(&tool.name, tool.description.unwrap_or_default())
                .with_params_schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "params": {
                            "type": "string",
                            "description": format!(
                                "The stringified parameters to the {} MCP tool. Here is the schema: {}",
                                tool.name, schema
                            )
                        }
                    },
                    "required": ["params"]
                }));
        Self { definition, client }
    }

    async fn call(&self, params: Value) -> Result<ActionOutcome, ActionError> {
        let ToolParams { params } = parse_params(params)?;
        let arguments: Value = serde_json::from_str(&params).map_err(|e| {
            ActionError::InvalidParameters(format!("params is not valid JSON: {}", e))
        })?;

        let name = self.action_type();
        debug!("Calling MCP tool {}", name);
        let result = self
            .client
            .call_tool(name, arguments)
            .await
            .map_err(|e| ActionError::ExecutionFailed(e.to_string()))?;

        let rendered = serde_json::to_string(&result)
            .map_err(|e| ActionError::ExecutionFailed(e.to_string()))?;
        Ok(ActionOutcome::success(format!(
            "MCP tool {} execution successful: {}",
            name, rendered
        )))
    }
}

#[async_trait]
impl Action for McpToolAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }

    async fn run(&self, params: Value, _ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        self.call(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::McpResponse;
    use crate::test_support::MockTransport;
    use serde_json::json;

    fn weather_tool() -> McpToolDefinition {
        serde_json::from_value(json!({
            "name": "get_forecast",
            "description": "Get the forecast for a city",
            "inputSchema": {"type": "object", "properties": {"city": {"type": "string"}}}
        }))
        .unwrap()
    }

    fn action_with(responses: Vec<McpResponse>) -> (McpToolAction, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new(responses));
        let client = Arc::new(McpClient::new(transport.clone()));
        (McpToolAction::new(weather_tool(), client), transport)
    }

    #[test]
    fn test_definition() {
        let (action, _) = action_with(vec![]);
        let definition = action.definition();
        assert_eq!(definition.action_type, "get_forecast");
        assert_eq!(definition.description, "Get the forecast for a city");
        assert_eq!(
            definition.params_schema["properties"]["params"]["description"],
            "The stringified parameters to the get_forecast MCP tool. Here is the schema: \
             {\"properties\":{\"city\":{\"type\":\"string\"}},\"type\":\"object\"}"
        );
        assert_eq!(definition.params_schema["required"], json!(["params"]));
    }

    #[test]
    fn test_missing_description_is_empty() {
        let tool: McpToolDefinition = serde_json::from_value(json!({"name": "ping"})).unwrap();
        let client = Arc::new(McpClient::new(Arc::new(MockTransport::default())));
        let action = McpToolAction::new(tool, client);
        assert_eq!(action.definition().description, "");
    }

    #[tokio::test]
    async fn test_call_success() {
        let (action, transport) = action_with(vec![McpResponse::success(
            1i64,
            json!({"content": [{"type": "text", "text": "sunny"}]}),
        )]);

        let outcome = action
            .call(json!({"params": "{\"city\": \"Paris\"}"}))
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(
            outcome.message,
            "MCP tool get_forecast execution successful: \
             {\"content\":[{\"type\":\"text\",\"text\":\"sunny\"}],\"isError\":false}"
        );

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].method, "tools/call");
        assert_eq!(
            requests[0].params,
            Some(json!({"name": "get_forecast", "arguments": {"city": "Paris"}}))
        );
    }

    #[tokio::test]
    async fn test_invalid_json_params() {
        let (action, transport) = action_with(vec![]);
        let err = action
            .call(json!({"params": "city=Paris"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidParameters(_)));
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tool_error_fails_action() {
        let (action, _) = action_with(vec![McpResponse::error(
            1i64,
            crate::protocol::McpError::invalid_params(),
        )]);
        let err = action.call(json!({"params": "{}"})).await.unwrap_err();
        assert!(matches!(err, ActionError::ExecutionFailed(ref m) if m.contains("Invalid params")));
    }
}
