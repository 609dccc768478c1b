//! Incoming payment tools, scoped under their invoice.

use serde_json::json;

use super::{body_without, object_schema, req_i64};
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("payments")
        .tool(
            "list_payments",
            "List payments recorded on an invoice",
            object_schema(
                json!({ "invoice_id": { "type": "integer", "description": "Invoice ID" } }),
                &["invoice_id"],
            ),
            |client, args| async move {
                let invoice = req_i64(&args, "invoice_id")?;
                client.get(&format!("/kb_invoice/{invoice}/payment")).await
            },
        )
        .tool(
            "get_payment",
            "Fetch a single payment on an invoice",
            object_schema(
                json!({
                    "invoice_id": { "type": "integer", "description": "Invoice ID" },
                    "payment_id": { "type": "integer", "description": "Payment ID" },
                }),
                &["invoice_id", "payment_id"],
            ),
            |client, args| async move {
                let invoice = req_i64(&args, "invoice_id")?;
                let payment = req_i64(&args, "payment_id")?;
                client.get(&format!("/kb_invoice/{invoice}/payment/{payment}")).await
            },
        )
        .tool(
            "create_payment",
            "Record a payment against an invoice",
            object_schema(
                json!({
                    "invoice_id": { "type": "integer", "description": "Invoice ID" },
                    "value": { "type": "number", "description": "Amount paid" },
                    "date": { "type": "string", "description": "Payment date (YYYY-MM-DD)" },
                }),
                &["invoice_id", "value"],
            ),
            |client, args| async move {
                let invoice = req_i64(&args, "invoice_id")?;
                let body = body_without(&args, &["invoice_id"]);
                client.post(&format!("/kb_invoice/{invoice}/payment"), &body).await
            },
        )
        .tool(
            "delete_payment",
            "Delete a payment from an invoice",
            object_schema(
                json!({
                    "invoice_id": { "type": "integer", "description": "Invoice ID" },
                    "payment_id": { "type": "integer", "description": "Payment ID" },
                }),
                &["invoice_id", "payment_id"],
            ),
            |client, args| async move {
                let invoice = req_i64(&args, "invoice_id")?;
                let payment = req_i64(&args, "payment_id")?;
                client
                    .delete(&format!("/kb_invoice/{invoice}/payment/{payment}"))
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
        assert_eq!(module.definitions.len(), 4);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
