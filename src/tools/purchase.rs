//! Purchase-side tools: supplier bills, expenses, purchase orders and the
//! outgoing payments recorded against bills.

use serde_json::{json, Map, Value};

use super::{
    body_without, id_schema, object_schema, page_query, paged_schema, req_i64,
};
use crate::client::build_search_criteria;
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("purchase")
        .tool(
            "list_bills",
            "List supplier bills with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/kb_bill{}", page_query(&args))).await
            },
        )
        .tool(
            "get_bill",
            "Fetch a single supplier bill",
            id_schema("bill_id", "Bill ID"),
            |client, args| async move {
                let id = req_i64(&args, "bill_id")?;
                client.get(&format!("/kb_bill/{id}")).await
            },
        )
        .tool(
            "create_bill",
            "Create a supplier bill",
            object_schema(
                json!({
                    "contact_id": { "type": "integer", "description": "Supplier contact" },
                    "title": { "type": "string" },
                    "positions": { "type": "array", "items": { "type": "object" } },
                }),
                &["contact_id"],
            ),
            |client, args| async move { client.post("/kb_bill", &args).await },
        )
        .tool(
            "update_bill",
            "Update fields of a supplier bill",
            object_schema(
                json!({
                    "bill_id": { "type": "integer", "description": "Bill ID" },
                    "title": { "type": "string" },
                }),
                &["bill_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "bill_id")?;
                let body = body_without(&args, &["bill_id"]);
                client.post(&format!("/kb_bill/{id}"), &body).await
            },
        )
        .tool(
            "delete_bill",
            "Delete a supplier bill",
            id_schema("bill_id", "Bill ID"),
            |client, args| async move {
                let id = req_i64(&args, "bill_id")?;
                client.delete(&format!("/kb_bill/{id}")).await
            },
        )
        .tool(
            "search_bills",
            "Search supplier bills by field filters",
            object_schema(
                json!({ "filters": { "type": "object", "description": "Field/value pairs" } }),
                &["filters"],
            ),
            |client, args| async move {
                let filters = args
                    .get("filters")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_else(Map::new);
                client.search("/kb_bill", &build_search_criteria(&filters)).await
            },
        )
        .tool(
            "issue_bill",
            "Issue a draft supplier bill",
            id_schema("bill_id", "Bill ID"),
            |client, args| async move {
                let id = req_i64(&args, "bill_id")?;
                client.post_action(&format!("/kb_bill/{id}/issue")).await
            },
        )
        .tool(
            "mark_bill_as_paid",
            "Mark a supplier bill as paid",
            id_schema("bill_id", "Bill ID"),
            |client, args| async move {
                let id = req_i64(&args, "bill_id")?;
                client.post_action(&format!("/kb_bill/{id}/mark_as_paid")).await
            },
        )
        .tool(
            "list_expenses",
            "List expenses with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/kb_expense{}", page_query(&args))).await
            },
        )
        .tool(
            "get_expense",
            "Fetch a single expense",
            id_schema("expense_id", "Expense ID"),
            |client, args| async move {
                let id = req_i64(&args, "expense_id")?;
                client.get(&format!("/kb_expense/{id}")).await
            },
        )
        .tool(
            "create_expense",
            "Create an expense",
            object_schema(
                json!({
                    "contact_id": { "type": "integer" },
                    "title": { "type": "string" },
                    "amount": { "type": "number" },
                }),
                &["contact_id"],
            ),
            |client, args| async move { client.post("/kb_expense", &args).await },
        )
        .tool(
            "update_expense",
            "Update fields of an expense",
            object_schema(
                json!({
                    "expense_id": { "type": "integer", "description": "Expense ID" },
                    "title": { "type": "string" },
                    "amount": { "type": "number" },
                }),
                &["expense_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "expense_id")?;
                let body = body_without(&args, &["expense_id"]);
                client.post(&format!("/kb_expense/{id}"), &body).await
            },
        )
        .tool(
            "delete_expense",
            "Delete an expense",
            id_schema("expense_id", "Expense ID"),
            |client, args| async move {
                let id = req_i64(&args, "expense_id")?;
                client.delete(&format!("/kb_expense/{id}")).await
            },
        )
        .tool(
            "list_purchase_orders",
            "List purchase orders with pagination",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/purchase_order{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "get_purchase_order",
            "Fetch a single purchase order",
            id_schema("purchase_order_id", "Purchase order ID"),
            |client, args| async move {
                let id = req_i64(&args, "purchase_order_id")?;
                client.get(&format!("/purchase_order/{id}")).await
            },
        )
        .tool(
            "create_purchase_order",
            "Create a purchase order",
            object_schema(
                json!({
                    "contact_id": { "type": "integer", "description": "Supplier contact" },
                    "title": { "type": "string" },
                    "positions": { "type": "array", "items": { "type": "object" } },
                }),
                &["contact_id"],
            ),
            |client, args| async move { client.post("/purchase_order", &args).await },
        )
        .tool(
            "update_purchase_order",
            "Update fields of a purchase order",
            object_schema(
                json!({
                    "purchase_order_id": { "type": "integer", "description": "Purchase order ID" },
                    "title": { "type": "string" },
                }),
                &["purchase_order_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "purchase_order_id")?;
                let body = body_without(&args, &["purchase_order_id"]);
                client.post(&format!("/purchase_order/{id}"), &body).await
            },
        )
        .tool(
            "delete_purchase_order",
            "Delete a purchase order",
            id_schema("purchase_order_id", "Purchase order ID"),
            |client, args| async move {
                let id = req_i64(&args, "purchase_order_id")?;
                client.delete(&format!("/purchase_order/{id}")).await
            },
        )
        .tool(
            "list_outgoing_payments",
            "List outgoing payments recorded on a supplier bill",
            object_schema(
                json!({ "bill_id": { "type": "integer", "description": "Bill ID" } }),
                &["bill_id"],
            ),
            |client, args| async move {
                let bill = req_i64(&args, "bill_id")?;
                client.get(&format!("/kb_bill/{bill}/payment")).await
            },
        )
        .tool(
            "get_outgoing_payment",
            "Fetch a single outgoing payment on a bill",
            object_schema(
                json!({
                    "bill_id": { "type": "integer", "description": "Bill ID" },
                    "payment_id": { "type": "integer", "description": "Payment ID" },
                }),
                &["bill_id", "payment_id"],
            ),
            |client, args| async move {
                let bill = req_i64(&args, "bill_id")?;
                let payment = req_i64(&args, "payment_id")?;
                client.get(&format!("/kb_bill/{bill}/payment/{payment}")).await
            },
        )
        .tool(
            "create_outgoing_payment",
            "Record an outgoing payment against a bill",
            object_schema(
                json!({
                    "bill_id": { "type": "integer", "description": "Bill ID" },
                    "value": { "type": "number", "description": "Amount paid" },
                    "date": { "type": "string", "description": "Payment date (YYYY-MM-DD)" },
                }),
                &["bill_id", "value"],
            ),
            |client, args| async move {
                let bill = req_i64(&args, "bill_id")?;
                let body = body_without(&args, &["bill_id"]);
                client.post(&format!("/kb_bill/{bill}/payment"), &body).await
            },
        )
        .tool(
            "update_outgoing_payment",
            "Update an outgoing payment on a bill",
            object_schema(
                json!({
                    "bill_id": { "type": "integer", "description": "Bill ID" },
                    "payment_id": { "type": "integer", "description": "Payment ID" },
                    "value": { "type": "number" },
                    "date": { "type": "string" },
                }),
                &["bill_id", "payment_id"],
            ),
            |client, args| async move {
                let bill = req_i64(&args, "bill_id")?;
                let payment = req_i64(&args, "payment_id")?;
                let body = body_without(&args, &["bill_id", "payment_id"]);
                client
                    .post(&format!("/kb_bill/{bill}/payment/{payment}"), &body)
                    .await
            },
        )
        .tool(
            "delete_outgoing_payment",
            "Delete an outgoing payment from a bill",
            object_schema(
                json!({
                    "bill_id": { "type": "integer", "description": "Bill ID" },
                    "payment_id": { "type": "integer", "description": "Payment ID" },
                }),
                &["bill_id", "payment_id"],
            ),
            |client, args| async move {
                let bill = req_i64(&args, "bill_id")?;
                let payment = req_i64(&args, "payment_id")?;
                client
                    .delete(&format!("/kb_bill/{bill}/payment/{payment}"))
                    .await
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete_and_paired() {
        let module = module();
        assert_eq!(module.definitions.len(), 23);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
