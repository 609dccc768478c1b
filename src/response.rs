//! MCP content envelopes for tool results.
//!
//! Every tool result, success or failure, becomes a content array with a
//! single text block. Success payloads are pretty-printed JSON keyed by a
//! per-tool data key with a `meta` block; both kinds end with a completion
//! sentinel so streaming consumers can detect a truncated payload.

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::McpError;

/// Marks the end of every text payload.
pub const COMPLETION_SENTINEL: &str = "\n\n--- RESPONSE COMPLETE ---";

/// A single content block inside a tool result.
#[derive(Debug, Clone, Serialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// The MCP tool-result envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ToolEnvelope {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolEnvelope {
    fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![ContentBlock {
                kind: "text".to_string(),
                text,
            }],
            is_error,
        }
    }
}

/// Chooses the top-level key the tool's payload is published under.
///
/// Composite tools get an explicit key; for the rest, `list_*`/`search_*`
/// keep the pluralized resource and `get_*`/mutators the singular. Anything
/// unrecognized falls back to `data`.
fn data_key(tool: &str) -> String {
    let explicit = match tool {
        "search_invoices_by_customer" | "get_open_invoices" | "get_overdue_invoices" => {
            Some("invoices")
        }
        "search_quotes_by_customer" => Some("quotes"),
        "search_orders_by_customer" => Some("orders"),
        "find_contact_by_number" | "find_contact_by_name" => Some("contact"),
        "list_all_statuses" | "list_invoice_statuses" => Some("statuses"),
        "get_reminders_sent_this_week" => Some("reminders"),
        "get_tasks_due_this_week" => Some("tasks"),
        "get_revenue_report"
        | "get_customer_revenue_report"
        | "get_invoice_status_report"
        | "get_overdue_invoices_report"
        | "get_monthly_revenue_report" => Some("report"),
        "get_top_customers_by_revenue" => Some("customers"),
        "issue_invoice" | "cancel_invoice" | "mark_invoice_as_sent" | "send_invoice"
        | "copy_invoice" => Some("invoice"),
        "issue_quote" | "accept_quote" | "decline_quote" | "send_quote" => Some("quote"),
        "create_order_from_quote" | "create_delivery_from_order" => Some("result"),
        "create_invoice_from_quote" | "create_invoice_from_order" => Some("invoice"),
        "issue_delivery" => Some("delivery"),
        "issue_bill" | "mark_bill_as_paid" => Some("bill"),
        "mark_reminder_as_sent" | "send_reminder" => Some("reminder"),
        "archive_project" | "unarchive_project" => Some("project"),
        "download_file" => Some("file"),
        "get_journal" => Some("journal"),
        "get_current_user" => Some("user"),
        "get_company_profile" | "update_company_profile" => Some("company_profile"),
        _ => None,
    };
    if let Some(key) = explicit {
        return key.to_string();
    }
    for prefix in ["list_all_", "list_", "search_", "get_", "create_", "update_", "delete_"] {
        if let Some(rest) = tool.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    "data".to_string()
}

/// Builds the success envelope for `tool` around `payload`.
pub fn success_envelope(tool: &str, payload: &Value) -> ToolEnvelope {
    let body = json!({
        data_key(tool): payload,
        "meta": {
            "source": "bexio",
            "fetched_at": Utc::now().to_rfc3339(),
            "tool": tool,
        },
    });
    // Pretty printing of a Value cannot fail.
    let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
    ToolEnvelope::text(format!("{text}{COMPLETION_SENTINEL}"), false)
}

/// Builds the error envelope for a classified failure.
///
/// The text block is the literal `Error: ` prefix followed by the serialized
/// error, so streaming consumers can detect failures without parsing JSON.
pub fn error_envelope(err: &McpError) -> ToolEnvelope {
    let body = serde_json::to_value(err).unwrap_or_else(|_| json!({ "message": err.message }));
    let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
    ToolEnvelope::text(format!("Error: {text}{COMPLETION_SENTINEL}"), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_uses_the_tool_data_key() {
        let envelope = success_envelope("list_contacts", &json!([{"id": 1}]));
        assert!(!envelope.is_error);
        let text = &envelope.content[0].text;
        assert!(text.contains("\"contacts\""));
        assert!(text.contains("\"source\": \"bexio\""));
        assert!(text.contains("\"tool\": \"list_contacts\""));
        assert!(text.ends_with(COMPLETION_SENTINEL));
    }

    #[test]
    fn unrecognized_tool_falls_back_to_data() {
        let envelope = success_envelope("ping", &json!("pong"));
        assert!(envelope.content[0].text.contains("\"data\""));
    }

    #[test]
    fn singular_key_for_get_tools() {
        let envelope = success_envelope("get_invoice", &json!({"id": 7}));
        assert!(envelope.content[0].text.contains("\"invoice\""));
    }

    #[test]
    fn error_envelope_is_flagged_and_terminated() {
        let err = McpError::not_found("Invoice", 99);
        let envelope = error_envelope(&err);
        assert!(envelope.is_error);
        let text = &envelope.content[0].text;
        assert!(text.contains("NOT_FOUND"));
        assert!(text.ends_with(COMPLETION_SENTINEL));
    }

    #[test]
    fn error_text_carries_the_error_prefix_and_bare_object() {
        let err = McpError::not_found("Invoice", 99);
        let text = &error_envelope(&err).content[0].text;
        assert!(text.starts_with("Error: {"));
        // The serialized error is the top-level object, not nested under a key.
        let json_part = text
            .strip_prefix("Error: ")
            .and_then(|t| t.strip_suffix(COMPLETION_SENTINEL))
            .unwrap();
        let parsed: Value = serde_json::from_str(json_part).unwrap();
        assert_eq!(parsed["code"], "NOT_FOUND");
        assert!(parsed.get("error").is_none());
    }

    #[test]
    fn is_error_is_omitted_on_success() {
        let envelope = success_envelope("ping", &json!("pong"));
        let value = serde_json::to_value(&envelope).unwrap();
        assert!(value.get("isError").is_none());
        assert_eq!(value["content"][0]["type"], "text");
    }
}
