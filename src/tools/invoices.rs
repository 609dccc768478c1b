//! Invoice tools: listing, search, lifecycle actions and the full-scan
//! variants the reports build on.

use chrono::Utc;
use serde_json::{json, Map, Value};

use super::{
    id_schema, object_schema, opt_str, page_query, paged_schema, req_i64, req_str,
};
use crate::client::{build_search_criteria, invoice_statuses};
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("invoices")
        .tool(
            "list_invoices",
            "List invoices with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/kb_invoice{}", page_query(&args))).await
            },
        )
        .tool(
            "list_all_invoices",
            "Fetch every invoice by paging through the catalog (bounded scan)",
            object_schema(
                json!({ "chunk_size": {
                    "type": "integer",
                    "description": "Page size used while scanning",
                    "default": 200,
                } }),
                &[],
            ),
            |client, args| async move {
                let chunk = args.get("chunk_size").and_then(Value::as_i64).unwrap_or(200);
                let invoices = client.list_all_invoices(chunk).await?;
                Ok(Value::Array(invoices))
            },
        )
        .tool(
            "get_invoice",
            "Fetch a single invoice by its ID",
            id_schema("invoice_id", "Invoice ID"),
            |client, args| async move {
                let id = req_i64(&args, "invoice_id")?;
                client.get(&format!("/kb_invoice/{id}")).await
            },
        )
        .tool(
            "search_invoices",
            "Search invoices by field filters; string values match partially",
            object_schema(
                json!({ "filters": {
                    "type": "object",
                    "description": "Field/value pairs, e.g. {\"contact_id\": 12}",
                } }),
                &["filters"],
            ),
            |client, args| async move {
                let filters = args
                    .get("filters")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_else(Map::new);
                client.search("/kb_invoice", &build_search_criteria(&filters)).await
            },
        )
        .tool(
            "search_invoices_by_customer",
            "Find all invoices for a customer by name, resolving contacts first",
            object_schema(
                json!({ "customer_name": { "type": "string", "description": "Customer name fragment" } }),
                &["customer_name"],
            ),
            |client, args| async move {
                let name = req_str(&args, "customer_name")?;
                client.search_invoices_by_customer(&name).await
            },
        )
        .tool(
            "create_invoice",
            "Create a draft invoice for a contact",
            object_schema(
                json!({
                    "contact_id": { "type": "integer", "description": "Billing contact" },
                    "title": { "type": "string", "description": "Invoice title" },
                    "is_valid_from": {
                        "type": "string",
                        "description": "Invoice date (YYYY-MM-DD); defaults to today",
                    },
                    "positions": {
                        "type": "array",
                        "description": "Invoice line items",
                        "items": { "type": "object" },
                    },
                }),
                &["contact_id"],
            ),
            |client, args| async move {
                let mut body = args.clone();
                if opt_str(&args, "is_valid_from").is_none() {
                    body["is_valid_from"] = json!(Utc::now().format("%Y-%m-%d").to_string());
                }
                client.post("/kb_invoice", &body).await
            },
        )
        .tool(
            "issue_invoice",
            "Issue a draft invoice, making it official",
            id_schema("invoice_id", "Invoice ID"),
            |client, args| async move {
                let id = req_i64(&args, "invoice_id")?;
                client.post_action(&format!("/kb_invoice/{id}/issue")).await
            },
        )
        .tool(
            "cancel_invoice",
            "Cancel an issued invoice",
            id_schema("invoice_id", "Invoice ID"),
            |client, args| async move {
                let id = req_i64(&args, "invoice_id")?;
                client.post_action(&format!("/kb_invoice/{id}/cancel")).await
            },
        )
        .tool(
            "mark_invoice_as_sent",
            "Mark an invoice as sent without emailing it",
            id_schema("invoice_id", "Invoice ID"),
            |client, args| async move {
                let id = req_i64(&args, "invoice_id")?;
                client.post_action(&format!("/kb_invoice/{id}/mark_as_sent")).await
            },
        )
        .tool(
            "send_invoice",
            "Send an invoice by email through bexio",
            object_schema(
                json!({
                    "invoice_id": { "type": "integer", "description": "Invoice ID" },
                    "recipient_email": { "type": "string", "description": "Override recipient" },
                    "subject": { "type": "string" },
                    "message": { "type": "string" },
                }),
                &["invoice_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "invoice_id")?;
                let body = super::body_without(&args, &["invoice_id"]);
                client.post(&format!("/kb_invoice/{id}/send"), &body).await
            },
        )
        .tool(
            "copy_invoice",
            "Copy an existing invoice into a new draft",
            object_schema(
                json!({
                    "invoice_id": { "type": "integer", "description": "Invoice to copy" },
                    "contact_id": { "type": "integer", "description": "Contact for the copy" },
                }),
                &["invoice_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "invoice_id")?;
                let body = super::body_without(&args, &["invoice_id"]);
                client.post(&format!("/kb_invoice/{id}/copy"), &body).await
            },
        )
        .tool(
            "list_invoice_statuses",
            "List the possible invoice statuses (static catalog, no API call)",
            super::empty_schema(),
            |_client, _args| async move { Ok(invoice_statuses()) },
        )
        .tool(
            "list_all_statuses",
            "List document statuses for invoices, quotes and orders (static catalog)",
            super::empty_schema(),
            |_client, _args| async move {
                Ok(json!({
                    "invoices": invoice_statuses(),
                    "quotes": [
                        { "id": 1, "name": "Draft" },
                        { "id": 2, "name": "Pending" },
                        { "id": 3, "name": "Confirmed" },
                        { "id": 4, "name": "Declined" },
                    ],
                    "orders": [
                        { "id": 5, "name": "Pending" },
                        { "id": 6, "name": "Done" },
                        { "id": 15, "name": "Partial" },
                        { "id": 21, "name": "Cancelled" },
                    ],
                }))
            },
        )
        .tool(
            "get_open_invoices",
            "List invoices still awaiting payment (draft or sent)",
            super::empty_schema(),
            |client, _args| async move {
                let invoices = client.open_invoices().await?;
                Ok(Value::Array(invoices))
            },
        )
        .tool(
            "get_overdue_invoices",
            "List sent invoices whose due date has passed",
            super::empty_schema(),
            |client, _args| async move {
                let invoices = client.overdue_invoices().await?;
                Ok(Value::Array(invoices))
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete_and_paired() {
        let module = module();
        assert_eq!(module.definitions.len(), 15);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
