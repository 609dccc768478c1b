//! Payment reminder tools, scoped under their invoice. The cross-invoice
//! searches tolerate invoices that have no reminders.

use serde_json::{json, Value};

use super::{body_without, object_schema, req_i64};
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("reminders")
        .tool(
            "list_reminders",
            "List payment reminders on an invoice",
            object_schema(
                json!({ "invoice_id": { "type": "integer", "description": "Invoice ID" } }),
                &["invoice_id"],
            ),
            |client, args| async move {
                let invoice = req_i64(&args, "invoice_id")?;
                client.get(&format!("/kb_invoice/{invoice}/reminder")).await
            },
        )
        .tool(
            "get_reminder",
            "Fetch a single reminder on an invoice",
            object_schema(
                json!({
                    "invoice_id": { "type": "integer", "description": "Invoice ID" },
                    "reminder_id": { "type": "integer", "description": "Reminder ID" },
                }),
                &["invoice_id", "reminder_id"],
            ),
            |client, args| async move {
                let invoice = req_i64(&args, "invoice_id")?;
                let reminder = req_i64(&args, "reminder_id")?;
                client
                    .get(&format!("/kb_invoice/{invoice}/reminder/{reminder}"))
                    .await
            },
        )
        .tool(
            "create_reminder",
            "Create a payment reminder for an overdue invoice",
            object_schema(
                json!({ "invoice_id": { "type": "integer", "description": "Invoice ID" } }),
                &["invoice_id"],
            ),
            |client, args| async move {
                let invoice = req_i64(&args, "invoice_id")?;
                let body = body_without(&args, &["invoice_id"]);
                client.post(&format!("/kb_invoice/{invoice}/reminder"), &body).await
            },
        )
        .tool(
            "delete_reminder",
            "Delete a reminder from an invoice",
            object_schema(
                json!({
                    "invoice_id": { "type": "integer", "description": "Invoice ID" },
                    "reminder_id": { "type": "integer", "description": "Reminder ID" },
                }),
                &["invoice_id", "reminder_id"],
            ),
            |client, args| async move {
                let invoice = req_i64(&args, "invoice_id")?;
                let reminder = req_i64(&args, "reminder_id")?;
                client
                    .delete(&format!("/kb_invoice/{invoice}/reminder/{reminder}"))
                    .await
            },
        )
        .tool(
            "mark_reminder_as_sent",
            "Mark a reminder as sent without emailing it",
            object_schema(
                json!({
                    "invoice_id": { "type": "integer", "description": "Invoice ID" },
                    "reminder_id": { "type": "integer", "description": "Reminder ID" },
                }),
                &["invoice_id", "reminder_id"],
            ),
            |client, args| async move {
                let invoice = req_i64(&args, "invoice_id")?;
                let reminder = req_i64(&args, "reminder_id")?;
                client
                    .post_action(&format!(
                        "/kb_invoice/{invoice}/reminder/{reminder}/mark_as_sent"
                    ))
                    .await
            },
        )
        .tool(
            "send_reminder",
            "Send a reminder by email through bexio",
            object_schema(
                json!({
                    "invoice_id": { "type": "integer", "description": "Invoice ID" },
                    "reminder_id": { "type": "integer", "description": "Reminder ID" },
                    "recipient_email": { "type": "string" },
                    "subject": { "type": "string" },
                    "message": { "type": "string" },
                }),
                &["invoice_id", "reminder_id"],
            ),
            |client, args| async move {
                let invoice = req_i64(&args, "invoice_id")?;
                let reminder = req_i64(&args, "reminder_id")?;
                let body = body_without(&args, &["invoice_id", "reminder_id"]);
                client
                    .post(
                        &format!("/kb_invoice/{invoice}/reminder/{reminder}/send"),
                        &body,
                    )
                    .await
            },
        )
        .tool(
            "search_reminders",
            "Collect reminders across open invoices (bounded scan)",
            object_schema(
                json!({ "limit": {
                    "type": "integer",
                    "description": "Maximum invoices to scan",
                    "default": 100,
                } }),
                &[],
            ),
            |client, args| async move {
                let limit = args.get("limit").and_then(Value::as_i64).unwrap_or(100);
                client.search_reminders(limit.max(0) as usize).await
            },
        )
        .tool(
            "get_reminders_sent_this_week",
            "List reminders created within the last seven days",
            super::empty_schema(),
            |client, _args| async move { client.reminders_sent_this_week().await },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete_and_paired() {
        let module = module();
        assert_eq!(module.definitions.len(), 8);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
