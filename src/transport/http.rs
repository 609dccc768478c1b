//! HTTP transport (axum).
//!
//! Serves the JSON-RPC surface on `POST /mcp` (single and batch) alongside
//! two direct-call endpoints: `POST /tools/call` for generic clients and
//! `POST /n8n/call` for n8n workflow nodes, which send `{tool, params}`
//! instead of `{name, arguments}`. The POST endpoints can be protected with
//! a shared-secret bearer token; the GET endpoints stay open.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::rpc::{self, JsonRpcRequest, JsonRpcResponse, ToolCallStyle};
use crate::dispatcher::Dispatcher;
use crate::error::{ErrorCode, McpError, McpResult};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub auth_token: Option<String>,
}

/// Builds the router with CORS and optional bearer auth on POST endpoints.
pub fn router(state: AppState) -> Router {
    if state.auth_token.is_none() {
        warn!("HTTP_AUTH_TOKEN is not set; POST endpoints are unauthenticated");
    }

    let protected = Router::new()
        .route("/mcp", post(mcp_endpoint))
        .route("/tools/call", post(tools_call_endpoint))
        .route("/n8n/call", post(n8n_call_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(health_endpoint))
        .route("/tools", get(tools_endpoint))
        .merge(protected)
        .layer(tower_http::cors::CorsLayer::permissive())
        .with_state(state)
}

/// Binds and serves until the process ends.
pub async fn serve(state: AppState, host: &str, port: u16) -> McpResult<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| McpError::internal(format!("failed to bind {addr}: {e}")))?;
    info!(%addr, "HTTP transport ready");
    axum::serve(listener, router(state))
        .await
        .map_err(|e| McpError::internal(format!("HTTP server failed: {e}")))
}

async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = &state.auth_token {
        let presented = request
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected.as_str()) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn health_endpoint(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "server": crate::SERVER_NAME,
        "version": crate::SERVER_VERSION,
        "mode": "http",
        "tools": state.dispatcher.registry().len(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn tools_endpoint(State(state): State<AppState>) -> Json<Value> {
    let definitions = state.dispatcher.registry().definitions();
    Json(json!({
        "tools": definitions,
        "count": definitions.len(),
    }))
}

/// Single and batch JSON-RPC. Batch elements run concurrently; notifications
/// produce no entry in the batch response.
async fn mcp_endpoint(State(state): State<AppState>, body: String) -> Response {
    let payload: Value = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            let response = JsonRpcResponse::failure(
                Value::Null,
                rpc::PARSE_ERROR,
                format!("Parse error: {e}"),
            );
            return Json(response).into_response();
        }
    };

    match payload {
        Value::Array(batch) => {
            let futures = batch
                .into_iter()
                .map(|element| handle_rpc_value(Arc::clone(&state.dispatcher), element));
            let responses: Vec<JsonRpcResponse> =
                join_all(futures).await.into_iter().flatten().collect();
            Json(responses).into_response()
        }
        single => match handle_rpc_value(Arc::clone(&state.dispatcher), single).await {
            Some(response) => Json(response).into_response(),
            None => StatusCode::NO_CONTENT.into_response(),
        },
    }
}

async fn handle_rpc_value(
    dispatcher: Arc<Dispatcher>,
    value: Value,
) -> Option<JsonRpcResponse> {
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return Some(JsonRpcResponse::failure(
                id,
                rpc::INVALID_REQUEST,
                format!("Invalid request: {e}"),
            ))
        }
    };
    rpc::handle_request(&dispatcher, request, ToolCallStyle::RpcError).await
}

async fn tools_call_endpoint(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Response {
    let Some(name) = body.get("name").and_then(Value::as_str) else {
        return direct_failure(
            StatusCode::BAD_REQUEST,
            "Missing required field: name",
            None,
        );
    };
    let args = body.get("arguments").cloned().unwrap_or_else(|| json!({}));
    direct_call(&state, name, args).await
}

async fn n8n_call_endpoint(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let Some(name) = body.get("tool").and_then(Value::as_str) else {
        return direct_failure(
            StatusCode::BAD_REQUEST,
            "Missing required field: tool",
            None,
        );
    };
    let args = body.get("params").cloned().unwrap_or_else(|| json!({}));
    direct_call(&state, name, args).await
}

/// Shared path for both direct-call endpoints: NOT_FOUND maps to 404,
/// VALIDATION_ERROR to 400, anything else (including upstream 404s) to the
/// generic 500 failure shape.
async fn direct_call(state: &AppState, name: &str, args: Value) -> Response {
    match state.dispatcher.dispatch(name, args).await {
        Ok(data) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": data,
                "tool": name,
                "timestamp": Utc::now().to_rfc3339(),
            })),
        )
            .into_response(),
        Err(err) => {
            let status = match err.code {
                ErrorCode::NotFound => StatusCode::NOT_FOUND,
                ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            direct_failure(status, &err.message, Some(name))
        }
    }
}

fn direct_failure(status: StatusCode, message: &str, tool: Option<&str>) -> Response {
    let mut body = json!({
        "success": false,
        "error": message,
        "timestamp": Utc::now().to_rfc3339(),
    });
    if let Some(tool) = tool {
        body["tool"] = json!(tool);
    }
    (status, Json(body)).into_response()
}
