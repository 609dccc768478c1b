//! Gateway behavior against a local stand-in upstream: error classification,
//! the bounded invoice scan, derived reports and the payroll probe.

mod common;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::Ordering;

use bexio_mcp::client::BexioClient;
use bexio_mcp::error::ErrorCode;
use bexio_mcp::probe::ProbeState;

use common::{hit_counter, spawn_upstream};

#[tokio::test]
async fn unauthorized_upstream_is_classified_with_a_token_hint() {
    let app = Router::new().route(
        "/contact",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid token" })),
            )
        }),
    );
    let base = spawn_upstream(app).await;
    let client = BexioClient::new(&base, "bad-token").unwrap();

    let err = client.get("/contact").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::UpstreamError);
    assert_eq!(err.status_code, Some(401));
    assert!(err.message.contains("Invalid token"));
    assert!(err.message.contains("BEXIO_API_TOKEN"));
}

#[tokio::test]
async fn unreachable_upstream_is_an_upstream_error_without_status() {
    // Nothing listens on this port.
    let client = BexioClient::new("http://127.0.0.1:9", "token").unwrap();
    let err = client.get("/contact").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::UpstreamError);
    assert_eq!(err.status_code, None);
    assert!(err.message.contains("No response received"));
}

fn invoice_fixture(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": i,
                "contact_id": (i % 3) + 1,
                "kb_item_status_id": if i % 2 == 0 { 9 } else { 8 },
                "total": 100.0,
                "is_valid_from": "2024-06-15",
            })
        })
        .collect()
}

#[tokio::test]
async fn full_scan_pages_until_a_short_page() {
    let invoices = invoice_fixture(250);
    let hits = hit_counter();
    let hits_for_handler = hits.clone();
    let app = Router::new().route(
        "/kb_invoice",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let invoices = invoices.clone();
            let hits = hits_for_handler.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(100);
                let offset: usize =
                    params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
                let page: Vec<Value> =
                    invoices.iter().skip(offset).take(limit).cloned().collect();
                Json(Value::Array(page))
            }
        }),
    );
    let base = spawn_upstream(app).await;
    let client = BexioClient::new(&base, "token").unwrap();

    let all = client.list_all_invoices(100).await.unwrap();
    assert_eq!(all.len(), 250);
    // Pages of 100, 100, 50; the short page ends the scan.
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn revenue_report_counts_only_paid_invoices_in_range() {
    let invoices = vec![
        json!({ "id": 1, "contact_id": 1, "kb_item_status_id": 9, "total": 100.0, "is_valid_from": "2024-06-01" }),
        json!({ "id": 2, "contact_id": 1, "kb_item_status_id": 8, "total": 900.0, "is_valid_from": "2024-06-02" }),
        json!({ "id": 3, "contact_id": 2, "kb_item_status_id": 9, "total": 50.0, "is_valid_from": "2023-01-01" }),
        json!({ "id": 4, "contact_id": 2, "kb_item_status_id": 9, "total": 25.0, "is_valid_from": "2024-06-30" }),
    ];
    let app = Router::new().route(
        "/kb_invoice",
        get(move || {
            let invoices = invoices.clone();
            async move { Json(Value::Array(invoices)) }
        }),
    );
    let base = spawn_upstream(app).await;
    let client = BexioClient::new(&base, "token").unwrap();

    let report = client.revenue_report("2024-06-01", "2024-06-30").await.unwrap();
    assert_eq!(report["total_revenue"], 125.0);
    assert_eq!(report["invoice_count"], 2);
}

#[tokio::test]
async fn top_customers_are_ranked_descending_and_truncated() {
    let invoices = vec![
        json!({ "id": 1, "contact_id": 1, "kb_item_status_id": 9, "total": 10.0, "is_valid_from": "2024-01-01" }),
        json!({ "id": 2, "contact_id": 2, "kb_item_status_id": 9, "total": 300.0, "is_valid_from": "2024-01-01" }),
        json!({ "id": 3, "contact_id": 3, "kb_item_status_id": 9, "total": 200.0, "is_valid_from": "2024-01-01" }),
        json!({ "id": 4, "contact_id": 2, "kb_item_status_id": 9, "total": 1.0, "is_valid_from": "2024-01-01" }),
    ];
    let app = Router::new().route(
        "/kb_invoice",
        get(move || {
            let invoices = invoices.clone();
            async move { Json(Value::Array(invoices)) }
        }),
    );
    let base = spawn_upstream(app).await;
    let client = BexioClient::new(&base, "token").unwrap();

    let report = client.top_customers_by_revenue(2, None, None).await.unwrap();
    let customers = report["customers"].as_array().unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0]["contact_id"], 2);
    assert_eq!(customers[0]["total_revenue"], 301.0);
    assert_eq!(customers[1]["contact_id"], 3);
}

#[tokio::test]
async fn forbidden_probe_caches_and_skips_later_requests() {
    let hits = hit_counter();
    let hits_for_handler = hits.clone();
    let app = Router::new().route(
        "/employee",
        get(move || {
            let hits = hits_for_handler.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (StatusCode::FORBIDDEN, Json(json!({ "message": "Forbidden" })))
            }
        }),
    );
    let base = spawn_upstream(app).await;
    let client = BexioClient::new(&base, "token").unwrap();

    let err = client.ensure_payroll_available().await.unwrap_err();
    assert!(err.message.contains("Payroll module is not available"));
    assert_eq!(client.payroll_probe().state(), ProbeState::Unavailable);

    // Second call is answered from the cache without touching the upstream.
    let err = client.ensure_payroll_available().await.unwrap_err();
    assert!(err.message.contains("Payroll module is not available"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transient_probe_failure_does_not_cache() {
    let hits = hit_counter();
    let hits_for_handler = hits.clone();
    let app = Router::new().route(
        "/employee",
        get(move || {
            let hits = hits_for_handler.clone();
            async move {
                let n = hits.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "message": "down" })))
                } else {
                    (StatusCode::OK, Json(json!([{ "id": 1 }])))
                }
            }
        }),
    );
    let base = spawn_upstream(app).await;
    let client = BexioClient::new(&base, "token").unwrap();

    let err = client.ensure_payroll_available().await.unwrap_err();
    assert_eq!(err.status_code, Some(503));
    assert_eq!(client.payroll_probe().state(), ProbeState::Unknown);

    // The outage has passed; the next probe succeeds and caches Available.
    client.ensure_payroll_available().await.unwrap();
    assert_eq!(client.payroll_probe().state(), ProbeState::Available);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_contact_number_is_not_found() {
    let app = Router::new().route(
        "/contact/search",
        post(|| async { Json(Value::Array(vec![])) }),
    );
    let base = spawn_upstream(app).await;
    let client = BexioClient::new(&base, "token").unwrap();

    let err = client.find_contact_by_number("C-404").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(err.message.contains("C-404"));
}

#[tokio::test]
async fn customer_invoice_search_returns_partial_context_when_no_contacts_match() {
    let app = Router::new().route(
        "/contact/search",
        post(|| async { Json(Value::Array(vec![])) }),
    );
    let base = spawn_upstream(app).await;
    let client = BexioClient::new(&base, "token").unwrap();

    let result = client.search_invoices_by_customer("Nobody AG").await.unwrap();
    assert_eq!(result["contacts_found"], 0);
    assert_eq!(result["invoices"], json!([]));
    assert_eq!(result["searched_name"], "Nobody AG");
}
