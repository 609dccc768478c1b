//! HTTP surface tests driven through the router in-process with oneshot
//! requests, plus one end-to-end upstream-failure scenario.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use bexio_mcp::client::BexioClient;
use bexio_mcp::dispatcher::Dispatcher;
use bexio_mcp::registry::ToolRegistry;
use bexio_mcp::transport::http::{router, AppState};

use common::spawn_upstream;

fn app(base_url: &str, auth_token: Option<&str>) -> Router {
    let client = Arc::new(BexioClient::new(base_url, "token").unwrap());
    let dispatcher = Arc::new(Dispatcher::new(ToolRegistry::standard(), client));
    router(AppState {
        dispatcher,
        auth_token: auth_token.map(str::to_string),
    })
}

/// An app whose upstream is unreachable; fine for tests that never call out.
fn offline_app(auth_token: Option<&str>) -> Router {
    app("http://127.0.0.1:9", auth_token)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_server_and_tool_count() {
    let response = offline_app(None)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["server"], "bexio-mcp");
    assert_eq!(body["mode"], "http");
    assert!(body["tools"].as_u64().unwrap() >= 190);
}

#[tokio::test]
async fn tools_endpoint_lists_the_catalog() {
    let response = offline_app(None)
        .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let tools = body["tools"].as_array().unwrap();
    assert!(tools.len() >= 190);
    assert_eq!(body["count"].as_u64().unwrap() as usize, tools.len());
    assert!(tools.iter().all(|t| t.get("inputSchema").is_some()));
}

#[tokio::test]
async fn configured_secret_rejects_unauthenticated_posts() {
    let app = offline_app(Some("s3cret"));

    let response = app
        .clone()
        .oneshot(post_json("/mcp", json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut request = post_json("/mcp", json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}));
    request
        .headers_mut()
        .insert("authorization", "Bearer s3cret".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn get_endpoints_stay_open_with_a_secret_configured() {
    let response = offline_app(Some("s3cret"))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn initialize_handshake_over_http() {
    let response = offline_app(None)
        .oneshot(post_json(
            "/mcp",
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(body["result"]["serverInfo"]["name"], "bexio-mcp");
}

#[tokio::test]
async fn batch_preserves_ids_and_flags_unknown_methods() {
    let response = offline_app(None)
        .oneshot(post_json(
            "/mcp",
            json!([
                {"jsonrpc": "2.0", "id": 1, "method": "tools/list"},
                {"jsonrpc": "2.0", "id": 2, "method": "bogus/method"},
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let responses = body.as_array().unwrap();
    assert_eq!(responses.len(), 2);

    let catalog = responses.iter().find(|r| r["id"] == 1).unwrap();
    assert!(catalog["result"]["tools"].as_array().unwrap().len() >= 190);

    let unknown = responses.iter().find(|r| r["id"] == 2).unwrap();
    assert_eq!(unknown["error"]["code"], -32601);
}

#[tokio::test]
async fn malformed_json_is_a_parse_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = offline_app(None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn direct_call_requires_a_name() {
    let response = offline_app(None)
        .oneshot(post_json("/tools/call", json!({"arguments": {}})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn direct_call_of_unknown_tool_is_404() {
    let response = offline_app(None)
        .oneshot(post_json(
            "/tools/call",
            json!({"name": "no_such_tool", "arguments": {}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["tool"], "no_such_tool");
}

#[tokio::test]
async fn upstream_404_surfaces_as_generic_500() {
    let upstream = Router::new().route(
        "/contact/:id",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Contact not found" })),
            )
        }),
    );
    let base = spawn_upstream(upstream).await;
    let response = app(&base, None)
        .oneshot(post_json(
            "/tools/call",
            json!({"name": "get_contact", "arguments": {"contact_id": 999}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Contact not found"));
}

#[tokio::test]
async fn n8n_endpoint_accepts_tool_and_params() {
    let response = offline_app(None)
        .oneshot(post_json("/n8n/call", json!({"tool": "ping", "params": {}})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "pong");
    assert_eq!(body["tool"], "ping");
}

#[tokio::test]
async fn validation_failure_is_a_400_with_field_details() {
    let response = offline_app(None)
        .oneshot(post_json(
            "/tools/call",
            json!({"name": "get_invoice", "arguments": {"invoice_id": "not-a-number"}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("invoice_id"));
}
