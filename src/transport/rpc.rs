//! JSON-RPC 2.0 message handling shared by both transports.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::dispatcher::Dispatcher;

/// Protocol revision advertised during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// An incoming JSON-RPC request or notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    /// Absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// How `tools/call` failures are surfaced.
///
/// The stdio transport reports them as successful responses carrying an
/// `isError` content envelope, as agent hosts expect; the HTTP transport
/// maps them to JSON-RPC internal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallStyle {
    Envelope,
    RpcError,
}

/// Handles one parsed request. Returns `None` for notifications.
pub async fn handle_request(
    dispatcher: &Dispatcher,
    request: JsonRpcRequest,
    style: ToolCallStyle,
) -> Option<JsonRpcResponse> {
    let id = match request.id {
        Some(id) => id,
        None => {
            debug!(method = %request.method, "ignoring notification");
            return None;
        }
    };

    let response = match request.method.as_str() {
        "initialize" => JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": crate::SERVER_NAME,
                    "version": crate::SERVER_VERSION,
                },
            }),
        ),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => JsonRpcResponse::success(
            id,
            json!({ "tools": dispatcher.registry().definitions() }),
        ),
        "tools/call" => {
            let params = request.params.unwrap_or(Value::Null);
            let Some(name) = params.get("name").and_then(Value::as_str) else {
                return Some(JsonRpcResponse::failure(
                    id,
                    INVALID_PARAMS,
                    "tools/call requires a string 'name' parameter",
                ));
            };
            let args = params
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| json!({}));
            match style {
                ToolCallStyle::Envelope => {
                    let envelope = dispatcher.dispatch_envelope(name, args).await;
                    match serde_json::to_value(&envelope) {
                        Ok(result) => JsonRpcResponse::success(id, result),
                        Err(e) => JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string()),
                    }
                }
                ToolCallStyle::RpcError => match dispatcher.dispatch(name, args).await {
                    Ok(payload) => {
                        let envelope = crate::response::success_envelope(name, &payload);
                        match serde_json::to_value(&envelope) {
                            Ok(result) => JsonRpcResponse::success(id, result),
                            Err(e) => JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string()),
                        }
                    }
                    Err(err) => JsonRpcResponse::failure(id, INTERNAL_ERROR, err.message),
                },
            }
        }
        other => JsonRpcResponse::failure(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
    };
    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::BexioClient;
    use crate::registry::{DomainModule, ToolRegistry};
    use std::sync::Arc;

    fn test_dispatcher() -> Dispatcher {
        let module = DomainModule::new("test").tool(
            "ping",
            "Health check",
            json!({ "type": "object", "properties": {} }),
            |_client, _args| async { Ok(json!("pong")) },
        );
        let mut registry = ToolRegistry::new();
        registry.register(module);
        let client = Arc::new(BexioClient::new("http://localhost:1", "token").unwrap());
        Dispatcher::new(registry, client)
    }

    fn request(method: &str, id: Value, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn initialize_advertises_protocol_and_server() {
        let dispatcher = test_dispatcher();
        let response = handle_request(
            &dispatcher,
            request("initialize", json!(1), None),
            ToolCallStyle::Envelope,
        )
        .await
        .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], crate::SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let dispatcher = test_dispatcher();
        let notification = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: "notifications/initialized".to_string(),
            params: None,
        };
        assert!(handle_request(&dispatcher, notification, ToolCallStyle::Envelope)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_32601() {
        let dispatcher = test_dispatcher();
        let response = handle_request(
            &dispatcher,
            request("bogus/method", json!(7), None),
            ToolCallStyle::Envelope,
        )
        .await
        .unwrap();
        assert_eq!(response.id, json!(7));
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn call_without_name_is_32602() {
        let dispatcher = test_dispatcher();
        let response = handle_request(
            &dispatcher,
            request("tools/call", json!(2), Some(json!({"arguments": {}}))),
            ToolCallStyle::Envelope,
        )
        .await
        .unwrap();
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn envelope_style_reports_tool_failure_as_is_error() {
        let dispatcher = test_dispatcher();
        let response = handle_request(
            &dispatcher,
            request(
                "tools/call",
                json!(3),
                Some(json!({"name": "missing_tool", "arguments": {}})),
            ),
            ToolCallStyle::Envelope,
        )
        .await
        .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("NOT_FOUND"));
    }

    #[tokio::test]
    async fn rpc_style_reports_tool_failure_as_internal_error() {
        let dispatcher = test_dispatcher();
        let response = handle_request(
            &dispatcher,
            request(
                "tools/call",
                json!(4),
                Some(json!({"name": "missing_tool", "arguments": {}})),
            ),
            ToolCallStyle::RpcError,
        )
        .await
        .unwrap();
        assert_eq!(response.error.unwrap().code, INTERNAL_ERROR);
    }
}
