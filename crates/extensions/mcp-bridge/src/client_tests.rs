use super::*;
use crate::test_support::MockTransport;
use serde_json::json;

#[tokio::test]
async fn test_initialize_sends_handshake() {
    let response = McpResponse::success(
        1i64,
        json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": {"name": "weather"}
        }),
    );

    let transport = Arc::new(MockTransport::new(vec![response]));
    let mut client = McpClient::new(transport.clone());

    client.initialize().await.unwrap();
    assert_eq!(
        client.server_info().unwrap()["serverInfo"]["name"],
        "weather"
    );

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests[0].method, "initialize");
    let params = requests[0].params.as_ref().unwrap();
    assert_eq!(params["clientInfo"]["name"], "webhands");
    assert_eq!(params["protocolVersion"], PROTOCOL_VERSION);
    assert_eq!(
        *transport.notifications.lock().unwrap(),
        vec!["notifications/initialized".to_string()]
    );
}

#[tokio::test]
async fn test_request_ids_increase() {
    let transport = Arc::new(MockTransport::new(vec![
        McpResponse::success(1i64, json!({"tools": []})),
        McpResponse::success(2i64, json!({"tools": []})),
    ]));
    let client = McpClient::new(transport.clone());

    client.list_tools().await.unwrap();
    client.list_tools().await.unwrap();

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests[0].id, 1i64.into());
    assert_eq!(requests[1].id, 2i64.into());
}

#[tokio::test]
async fn test_list_tools() {
    let response = McpResponse::success(
        1i64,
        json!({
            "tools": [
                {
                    "name": "test_tool",
                    "description": "A test tool",
                    "inputSchema": {"type": "object"}
                }
            ]
        }),
    );

    let transport = Arc::new(MockTransport::new(vec![response]));
    let client = McpClient::new(transport);

    let tools = client.list_tools().await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "test_tool");
}

#[tokio::test]
async fn test_list_tools_malformed() {
    let transport = Arc::new(MockTransport::new(vec![McpResponse::success(
        1i64,
        json!({"tools": [{"description": "no name"}]}),
    )]));
    let client = McpClient::new(transport);

    let result = client.list_tools().await;
    assert!(matches!(result, Err(McpClientError::ProtocolError(_))));
}

#[tokio::test]
async fn test_call_tool() {
    let response = McpResponse::success(
        1i64,
        json!({
            "content": [{"type": "text", "text": "Hello"}],
            "isError": false
        }),
    );

    let transport = Arc::new(MockTransport::new(vec![response]));
    let client = McpClient::new(transport.clone());

    let result = client
        .call_tool("greet", json!({"name": "Ada"}))
        .await
        .unwrap();
    assert!(!result.is_error);
    assert_eq!(result.content.len(), 1);

    let requests = transport.requests.lock().unwrap();
    assert_eq!(
        requests[0].params,
        Some(json!({"name": "greet", "arguments": {"name": "Ada"}}))
    );
}

#[tokio::test]
async fn test_server_error() {
    let response = McpResponse::error(1i64, crate::protocol::McpError::method_not_found());

    let transport = Arc::new(MockTransport::new(vec![response]));
    let client = McpClient::new(transport);

    let result = client.list_tools().await;
    assert!(matches!(
        result,
        Err(McpClientError::ServerError { code: -32601, .. })
    ));
}

#[tokio::test]
async fn test_closed_transport() {
    let client = McpClient::new(Arc::new(MockTransport::default()));
    let err = client.list_tools().await.unwrap_err();
    assert!(err.to_string().contains("Connection closed"));
}
