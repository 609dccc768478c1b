//! HTTP gateway to the bexio API.
//!
//! `BexioClient` owns the reqwest client, the credentials and the payroll
//! probe. It exposes generic verbs the tool handlers compose, plus a small
//! set of multi-request operations (full invoice scans, derived reports,
//! contact lookups) that belong below the tool layer because several tools
//! share them.

use chrono::{Datelike, Duration, Utc};
use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{McpError, McpResult};
use crate::probe::{FeatureProbe, ProbeState};

/// Upper bound on items examined by a full scan. Reports built on a scan
/// that hits this ceiling are an approximation of the true totals.
pub const SCAN_CEILING: usize = 10_000;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Invoice status: draft.
pub const STATUS_DRAFT: i64 = 7;
/// Invoice status: sent/open.
pub const STATUS_SENT: i64 = 8;
/// Invoice status: paid.
pub const STATUS_PAID: i64 = 9;
/// Invoice status: cancelled.
pub const STATUS_CANCELLED: i64 = 19;

/// Shared gateway handle passed to every tool handler.
pub struct BexioClient {
    http: Client,
    base_url: String,
    api_token: String,
    payroll_probe: FeatureProbe,
}

impl BexioClient {
    /// Builds a client for `base_url` authenticating with `api_token`.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> McpResult<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| McpError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            payroll_probe: FeatureProbe::new(),
        })
    }

    /// Replaces the payroll probe, typically with a pre-seeded one in tests.
    pub fn with_payroll_probe(mut self, probe: FeatureProbe) -> Self {
        self.payroll_probe = probe;
        self
    }

    pub fn payroll_probe(&self) -> &FeatureProbe {
        &self.payroll_probe
    }

    /// Core request path. Classifies every failure into the error taxonomy;
    /// an empty success body becomes `Value::Null`.
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<&Value>,
    ) -> McpResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "bexio request");

        let mut req = self
            .http
            .request(method, &url)
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json");
        if let Some(query) = query {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| {
            McpError::upstream(
                "No response received from server",
                None,
                Some(json!({ "endpoint": path, "cause": e.to_string(), "kind": "NETWORK_ERROR" })),
            )
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            McpError::upstream(
                format!("Failed to read response body: {e}"),
                Some(status.as_u16()),
                Some(json!({ "endpoint": path })),
            )
        })?;

        if !status.is_success() {
            let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(McpError::upstream(
                message,
                Some(status.as_u16()),
                Some(json!({ "endpoint": path, "body": body })),
            ));
        }

        if text.trim().is_empty() || status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            McpError::upstream(
                format!("Invalid JSON in response: {e}"),
                Some(status.as_u16()),
                Some(json!({ "endpoint": path })),
            )
        })
    }

    pub async fn get(&self, path: &str) -> McpResult<Value> {
        self.request(Method::GET, path, None, None).await
    }

    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> McpResult<Value> {
        self.request(Method::GET, path, Some(query), None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> McpResult<Value> {
        self.request(Method::POST, path, None, Some(body)).await
    }

    /// POST with an empty body, used by action endpoints like `/issue`.
    pub async fn post_action(&self, path: &str) -> McpResult<Value> {
        self.request(Method::POST, path, None, Some(&json!({}))).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> McpResult<Value> {
        self.request(Method::PUT, path, None, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> McpResult<Value> {
        self.request(Method::PATCH, path, None, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> McpResult<Value> {
        self.request(Method::DELETE, path, None, None).await
    }

    /// POSTs a bexio search criteria array to `{path}/search`.
    pub async fn search(&self, path: &str, criteria: &Value) -> McpResult<Value> {
        self.request(Method::POST, &format!("{path}/search"), None, Some(criteria))
            .await
    }

    /// GET against the 3.0 API (taxes live there). When the configured base
    /// ends in `/2.0` the version segment is swapped; otherwise the path is
    /// served from the same base, which is what test doubles expect.
    pub async fn get_v3(&self, path: &str) -> McpResult<Value> {
        if let Some(root) = self.base_url.strip_suffix("/2.0") {
            let url = format!("{root}/3.0{path}");
            debug!(%url, "bexio 3.0 request");
            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.api_token)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| {
                    McpError::upstream(
                        "No response received from server",
                        None,
                        Some(json!({ "endpoint": path, "cause": e.to_string(), "kind": "NETWORK_ERROR" })),
                    )
                })?;
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(McpError::upstream(
                    status.canonical_reason().unwrap_or("request failed"),
                    Some(status.as_u16()),
                    Some(json!({ "endpoint": path })),
                ));
            }
            return serde_json::from_str(&text).map_err(|e| {
                McpError::upstream(
                    format!("Invalid JSON in response: {e}"),
                    Some(status.as_u16()),
                    Some(json!({ "endpoint": path })),
                )
            });
        }
        self.get(path).await
    }

    // ----- payroll gating -------------------------------------------------

    /// Resolves whether the payroll module is enabled, probing at most once
    /// per cached verdict.
    pub async fn ensure_payroll_available(&self) -> McpResult<()> {
        if let Some(verdict) = self.payroll_probe.cached_verdict() {
            return verdict;
        }
        debug!("probing payroll availability");
        let outcome = self.get("/employee?limit=1").await.map(|_| ());
        let verdict = self.payroll_probe.record(outcome);
        if self.payroll_probe.state() == ProbeState::Unavailable {
            warn!("payroll module unavailable on this account; caching verdict");
        }
        verdict
    }

    // ----- full scans and derived data ------------------------------------

    /// Fetches every invoice via offset pagination.
    ///
    /// Stops on an empty or short page, or once [`SCAN_CEILING`] items have
    /// been collected. Rejects a non-positive chunk size before touching the
    /// network.
    pub async fn list_all_invoices(&self, chunk_size: i64) -> McpResult<Vec<Value>> {
        if chunk_size <= 0 {
            return Err(McpError::validation(
                format!("chunk_size must be positive, got {chunk_size}"),
                Some(json!({ "issues": [{ "field": "chunk_size", "message": "must be greater than zero" }] })),
            ));
        }

        let mut all = Vec::new();
        let mut offset: i64 = 0;
        loop {
            let page = self
                .get(&format!("/kb_invoice?limit={chunk_size}&offset={offset}"))
                .await?;
            let page = match page {
                Value::Array(items) => items,
                Value::Null => Vec::new(),
                other => {
                    return Err(McpError::upstream(
                        "Expected an array of invoices",
                        None,
                        Some(json!({ "got": other })),
                    ))
                }
            };
            let fetched = page.len();
            all.extend(page);
            if fetched < chunk_size as usize {
                break;
            }
            if all.len() >= SCAN_CEILING {
                warn!(
                    scanned = all.len(),
                    "invoice scan hit the ceiling; results are truncated"
                );
                all.truncate(SCAN_CEILING);
                break;
            }
            offset += chunk_size;
        }
        Ok(all)
    }

    /// Sum of `total` across paid invoices in the inclusive date range.
    pub async fn revenue_report(&self, start_date: &str, end_date: &str) -> McpResult<Value> {
        let invoices = self.list_all_invoices(200).await?;
        let paid: Vec<&Value> = invoices
            .iter()
            .filter(|inv| is_paid(inv) && in_date_range(inv, start_date, end_date))
            .collect();
        let total: f64 = paid.iter().map(|inv| invoice_total(inv)).sum();
        Ok(json!({
            "start_date": start_date,
            "end_date": end_date,
            "total_revenue": total,
            "invoice_count": paid.len(),
            "currency": "CHF",
        }))
    }

    /// Paid revenue for one customer in the inclusive date range.
    pub async fn customer_revenue_report(
        &self,
        contact_id: i64,
        start_date: &str,
        end_date: &str,
    ) -> McpResult<Value> {
        let invoices = self.list_all_invoices(200).await?;
        let matching: Vec<&Value> = invoices
            .iter()
            .filter(|inv| {
                inv.get("contact_id").and_then(Value::as_i64) == Some(contact_id)
                    && is_paid(inv)
                    && in_date_range(inv, start_date, end_date)
            })
            .collect();
        let total: f64 = matching.iter().map(|inv| invoice_total(inv)).sum();
        Ok(json!({
            "contact_id": contact_id,
            "start_date": start_date,
            "end_date": end_date,
            "total_revenue": total,
            "invoice_count": matching.len(),
            "invoices": matching,
        }))
    }

    /// Count and total per invoice status across all invoices.
    pub async fn invoice_status_report(&self) -> McpResult<Value> {
        let invoices = self.list_all_invoices(200).await?;
        let mut counts: HashMap<i64, (usize, f64)> = HashMap::new();
        for inv in &invoices {
            let status = inv.get("kb_item_status_id").and_then(Value::as_i64).unwrap_or(0);
            let entry = counts.entry(status).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += invoice_total(inv);
        }
        let mut by_status: Vec<Value> = counts
            .into_iter()
            .map(|(status, (count, total))| {
                json!({
                    "status_id": status,
                    "status_name": status_name(status),
                    "count": count,
                    "total": total,
                })
            })
            .collect();
        by_status.sort_by_key(|s| s["status_id"].as_i64().unwrap_or(0));
        Ok(json!({
            "total_invoices": invoices.len(),
            "by_status": by_status,
        }))
    }

    /// Paid revenue per calendar month of a year.
    pub async fn monthly_revenue_report(&self, year: i64) -> McpResult<Value> {
        let invoices = self.list_all_invoices(200).await?;
        let mut months = vec![(0usize, 0.0f64); 12];
        for inv in invoices.iter().filter(|inv| is_paid(inv)) {
            let date = invoice_date(inv);
            if let Some((inv_year, month)) = parse_year_month(date) {
                if inv_year == year && (1..=12).contains(&month) {
                    months[(month - 1) as usize].0 += 1;
                    months[(month - 1) as usize].1 += invoice_total(inv);
                }
            }
        }
        let monthly: Vec<Value> = months
            .iter()
            .enumerate()
            .map(|(i, (count, total))| {
                json!({ "month": i + 1, "invoice_count": count, "revenue": total })
            })
            .collect();
        let total: f64 = months.iter().map(|(_, t)| t).sum();
        Ok(json!({
            "year": year,
            "total_revenue": total,
            "months": monthly,
        }))
    }

    /// Customers ranked by paid revenue, descending, truncated to `limit`.
    pub async fn top_customers_by_revenue(
        &self,
        limit: usize,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> McpResult<Value> {
        let invoices = self.list_all_invoices(200).await?;
        let mut by_contact: HashMap<i64, (usize, f64)> = HashMap::new();
        for inv in invoices.iter().filter(|inv| is_paid(inv)) {
            if let (Some(start), Some(end)) = (start_date, end_date) {
                if !in_date_range(inv, start, end) {
                    continue;
                }
            }
            let contact = inv.get("contact_id").and_then(Value::as_i64).unwrap_or(0);
            let entry = by_contact.entry(contact).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += invoice_total(inv);
        }
        let mut ranked: Vec<(i64, usize, f64)> = by_contact
            .into_iter()
            .map(|(contact, (count, total))| (contact, count, total))
            .collect();
        // Stable ordering: revenue descending, contact id as tie-breaker.
        ranked.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked.truncate(limit);
        let customers: Vec<Value> = ranked
            .into_iter()
            .map(|(contact, count, total)| {
                json!({ "contact_id": contact, "invoice_count": count, "total_revenue": total })
            })
            .collect();
        Ok(json!({ "limit": limit, "customers": customers }))
    }

    /// Invoices still awaiting payment (draft or sent).
    pub async fn open_invoices(&self) -> McpResult<Vec<Value>> {
        let invoices = self.list_all_invoices(200).await?;
        Ok(invoices
            .into_iter()
            .filter(|inv| {
                matches!(
                    inv.get("kb_item_status_id").and_then(Value::as_i64),
                    Some(STATUS_DRAFT) | Some(STATUS_SENT)
                )
            })
            .collect())
    }

    /// Sent invoices whose due date has passed.
    pub async fn overdue_invoices(&self) -> McpResult<Vec<Value>> {
        let invoices = self.list_all_invoices(200).await?;
        let today = Utc::now().format("%Y-%m-%d").to_string();
        Ok(invoices
            .into_iter()
            .filter(|inv| {
                inv.get("kb_item_status_id").and_then(Value::as_i64) == Some(STATUS_SENT)
                    && inv
                        .get("is_valid_to")
                        .and_then(Value::as_str)
                        .map(|due| due < today.as_str())
                        .unwrap_or(false)
            })
            .collect())
    }

    /// Timesheets dated within the next seven days.
    pub async fn tasks_due_this_week(&self) -> McpResult<Value> {
        let today = Utc::now().date_naive();
        let week_end = today + Duration::days(7);
        let timesheets = self.get("/timesheet?limit=500").await?;
        let tasks: Vec<Value> = timesheets
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter(|t| {
                        t.get("date")
                            .and_then(Value::as_str)
                            .and_then(|d| d.parse::<chrono::NaiveDate>().ok())
                            .map(|d| d >= today && d <= week_end)
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(json!({
            "week_start": today.to_string(),
            "week_end": week_end.to_string(),
            "count": tasks.len(),
            "tasks": tasks,
        }))
    }

    // ----- contact helpers ------------------------------------------------

    /// Searches contacts whose name matches `name` (LIKE semantics).
    pub async fn search_contacts_by_name(&self, name: &str) -> McpResult<Value> {
        self.search(
            "/contact",
            &json!([{ "field": "name_1", "value": format!("%{name}%"), "criteria": "like" }]),
        )
        .await
    }

    /// Exact lookup by contact number; NOT_FOUND when nothing matches.
    pub async fn find_contact_by_number(&self, number: &str) -> McpResult<Value> {
        let result = self
            .search(
                "/contact",
                &json!([{ "field": "nr", "value": number, "criteria": "=" }]),
            )
            .await?;
        match result.as_array().and_then(|a| a.first()) {
            Some(contact) => Ok(contact.clone()),
            None => Err(McpError::not_found("Contact", number)),
        }
    }

    /// First contact matching `name`; NOT_FOUND when nothing matches.
    pub async fn find_contact_by_name(&self, name: &str) -> McpResult<Value> {
        let result = self.search_contacts_by_name(name).await?;
        match result.as_array().and_then(|a| a.first()) {
            Some(contact) => Ok(contact.clone()),
            None => Err(McpError::not_found("Contact", name)),
        }
    }

    /// Resolves a customer name to contacts, then collects their invoices.
    ///
    /// When no contact matches, returns a partial context instead of an
    /// error so the caller can see what was searched.
    pub async fn search_invoices_by_customer(&self, customer_name: &str) -> McpResult<Value> {
        let contacts = self.search_contacts_by_name(customer_name).await?;
        let contacts = contacts.as_array().cloned().unwrap_or_default();
        if contacts.is_empty() {
            return Ok(json!({
                "invoices": [],
                "contacts_found": 0,
                "searched_name": customer_name,
                "hint": "No contacts matched this name. Try search_contacts with a shorter fragment.",
            }));
        }
        let mut invoices = Vec::new();
        for contact in &contacts {
            if let Some(id) = contact.get("id").and_then(Value::as_i64) {
                let found = self
                    .search(
                        "/kb_invoice",
                        &json!([{ "field": "contact_id", "value": id, "criteria": "=" }]),
                    )
                    .await?;
                if let Some(items) = found.as_array() {
                    invoices.extend(items.iter().cloned());
                }
            }
        }
        Ok(json!({
            "invoices": invoices,
            "contacts_found": contacts.len(),
            "searched_name": customer_name,
        }))
    }

    /// Scans sent invoices for their reminders, tolerating per-invoice
    /// failures (an invoice without reminders 404s).
    pub async fn search_reminders(&self, limit: usize) -> McpResult<Value> {
        let invoices = self.open_invoices().await?;
        let mut reminders = Vec::new();
        let mut scanned = 0usize;
        for inv in invoices.iter().take(limit) {
            let Some(id) = inv.get("id").and_then(Value::as_i64) else {
                continue;
            };
            scanned += 1;
            match self.get(&format!("/kb_invoice/{id}/reminder")).await {
                Ok(Value::Array(items)) => reminders.extend(items),
                Ok(_) => {}
                Err(err) => {
                    debug!(invoice_id = id, error = %err, "skipping invoice without reminders");
                }
            }
        }
        Ok(json!({
            "reminders": reminders,
            "invoices_scanned": scanned,
        }))
    }

    /// Reminders created within the last seven days.
    pub async fn reminders_sent_this_week(&self) -> McpResult<Value> {
        let result = self.search_reminders(100).await?;
        let week_ago = (Utc::now() - Duration::days(7)).format("%Y-%m-%d").to_string();
        let recent: Vec<Value> = result["reminders"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter(|r| {
                        r.get("is_valid_from")
                            .and_then(Value::as_str)
                            .map(|d| d >= week_ago.as_str())
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(json!({ "reminders": recent, "since": week_ago }))
    }
}

/// Assembles bexio search criteria from a flat filter map, wrapping string
/// values in `%` for LIKE matching.
pub fn build_search_criteria(filters: &Map<String, Value>) -> Value {
    let criteria: Vec<Value> = filters
        .iter()
        .map(|(field, value)| match value {
            Value::String(s) => json!({
                "field": field,
                "value": format!("%{s}%"),
                "criteria": "like",
            }),
            other => json!({ "field": field, "value": other, "criteria": "=" }),
        })
        .collect();
    Value::Array(criteria)
}

/// Human-readable name for a kb_item status id.
pub fn status_name(status: i64) -> &'static str {
    match status {
        STATUS_DRAFT => "Draft",
        STATUS_SENT => "Sent",
        STATUS_PAID => "Paid",
        16 => "Partially paid",
        STATUS_CANCELLED => "Cancelled",
        _ => "Unknown",
    }
}

/// The static invoice status catalog served without an upstream call.
pub fn invoice_statuses() -> Value {
    json!([
        { "id": STATUS_DRAFT, "name": "Draft", "description": "Invoice created but not yet issued" },
        { "id": STATUS_SENT, "name": "Sent", "description": "Invoice issued and awaiting payment" },
        { "id": STATUS_PAID, "name": "Paid", "description": "Invoice fully paid" },
        { "id": 16, "name": "Partially paid", "description": "Partial payment received" },
        { "id": STATUS_CANCELLED, "name": "Cancelled", "description": "Invoice cancelled" },
    ])
}

fn is_paid(invoice: &Value) -> bool {
    invoice.get("kb_item_status_id").and_then(Value::as_i64) == Some(STATUS_PAID)
}

fn invoice_total(invoice: &Value) -> f64 {
    match invoice.get("total") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn invoice_date(invoice: &Value) -> &str {
    invoice
        .get("is_valid_from")
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// Inclusive string comparison on `is_valid_from` against the bounds. Dates
/// are ISO `YYYY-MM-DD` so lexical order is chronological order.
fn in_date_range(invoice: &Value, start: &str, end: &str) -> bool {
    let date = invoice_date(invoice);
    !date.is_empty() && date >= start && date <= end
}

fn parse_year_month(date: &str) -> Option<(i64, i64)> {
    let parsed: chrono::NaiveDate = date.get(..10)?.parse().ok()?;
    Some((parsed.year() as i64, parsed.month() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_wraps_strings_for_like_matching() {
        let mut filters = Map::new();
        filters.insert("title".to_string(), json!("Website"));
        filters.insert("contact_id".to_string(), json!(12));
        let criteria = build_search_criteria(&filters);
        let arr = criteria.as_array().unwrap();
        let title = arr.iter().find(|c| c["field"] == "title").unwrap();
        assert_eq!(title["value"], "%Website%");
        assert_eq!(title["criteria"], "like");
        let contact = arr.iter().find(|c| c["field"] == "contact_id").unwrap();
        assert_eq!(contact["value"], 12);
        assert_eq!(contact["criteria"], "=");
    }

    #[test]
    fn date_range_is_inclusive_on_both_bounds() {
        let inv = json!({ "is_valid_from": "2024-03-15" });
        assert!(in_date_range(&inv, "2024-03-15", "2024-03-15"));
        assert!(in_date_range(&inv, "2024-01-01", "2024-12-31"));
        assert!(!in_date_range(&inv, "2024-03-16", "2024-12-31"));
        assert!(!in_date_range(&inv, "2024-01-01", "2024-03-14"));
    }

    #[test]
    fn missing_date_never_matches() {
        let inv = json!({});
        assert!(!in_date_range(&inv, "2000-01-01", "2099-12-31"));
    }

    #[test]
    fn total_tolerates_string_amounts() {
        assert_eq!(invoice_total(&json!({ "total": 100.5 })), 100.5);
        assert_eq!(invoice_total(&json!({ "total": "250.00" })), 250.0);
        assert_eq!(invoice_total(&json!({})), 0.0);
    }

    #[test]
    fn status_catalog_is_static() {
        let statuses = invoice_statuses();
        let arr = statuses.as_array().unwrap();
        assert_eq!(arr.len(), 5);
        assert_eq!(arr[2]["id"], STATUS_PAID);
        assert_eq!(arr[2]["name"], "Paid");
    }

    #[tokio::test]
    async fn full_scan_rejects_non_positive_chunk_size() {
        let client = BexioClient::new("http://localhost:1", "token").unwrap();
        let err = client.list_all_invoices(0).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
        let err = client.list_all_invoices(-5).await.unwrap_err();
        assert!(err.details.unwrap()["issues"][0]["field"] == "chunk_size");
    }
}
