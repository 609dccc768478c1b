//! Derived report tools. All of them build on the bounded invoice scan in
//! the gateway; totals beyond the scan ceiling are an approximation.

use serde_json::{json, Value};

use super::{object_schema, opt_str, req_i64, req_str};
use crate::registry::DomainModule;

fn date_range_schema() -> Value {
    object_schema(
        json!({
            "start_date": { "type": "string", "description": "Inclusive start (YYYY-MM-DD)" },
            "end_date": { "type": "string", "description": "Inclusive end (YYYY-MM-DD)" },
        }),
        &["start_date", "end_date"],
    )
}

pub fn module() -> DomainModule {
    DomainModule::new("reports")
        .tool(
            "get_revenue_report",
            "Total paid revenue within a date range",
            date_range_schema(),
            |client, args| async move {
                let start = req_str(&args, "start_date")?;
                let end = req_str(&args, "end_date")?;
                client.revenue_report(&start, &end).await
            },
        )
        .tool(
            "get_customer_revenue_report",
            "Paid revenue of one customer within a date range",
            object_schema(
                json!({
                    "contact_id": { "type": "integer", "description": "Customer contact ID" },
                    "start_date": { "type": "string", "description": "Inclusive start (YYYY-MM-DD)" },
                    "end_date": { "type": "string", "description": "Inclusive end (YYYY-MM-DD)" },
                }),
                &["contact_id", "start_date", "end_date"],
            ),
            |client, args| async move {
                let contact = req_i64(&args, "contact_id")?;
                let start = req_str(&args, "start_date")?;
                let end = req_str(&args, "end_date")?;
                client.customer_revenue_report(contact, &start, &end).await
            },
        )
        .tool(
            "get_invoice_status_report",
            "Invoice counts and totals grouped by status",
            super::empty_schema(),
            |client, _args| async move { client.invoice_status_report().await },
        )
        .tool(
            "get_overdue_invoices_report",
            "Overdue invoices with their outstanding totals",
            super::empty_schema(),
            |client, _args| async move {
                let overdue = client.overdue_invoices().await?;
                let total: f64 = overdue
                    .iter()
                    .map(|inv| match inv.get("total") {
                        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
                        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
                        _ => 0.0,
                    })
                    .sum();
                Ok(json!({
                    "count": overdue.len(),
                    "total_outstanding": total,
                    "invoices": overdue,
                }))
            },
        )
        .tool(
            "get_monthly_revenue_report",
            "Paid revenue per calendar month of a year",
            object_schema(
                json!({ "year": { "type": "integer", "description": "Calendar year, e.g. 2025" } }),
                &["year"],
            ),
            |client, args| async move {
                let year = req_i64(&args, "year")?;
                client.monthly_revenue_report(year).await
            },
        )
        .tool(
            "get_top_customers_by_revenue",
            "Customers ranked by paid revenue, descending",
            object_schema(
                json!({
                    "limit": { "type": "integer", "description": "How many customers", "default": 10 },
                    "start_date": { "type": "string", "description": "Optional inclusive start" },
                    "end_date": { "type": "string", "description": "Optional inclusive end" },
                }),
                &[],
            ),
            |client, args| async move {
                let limit = args.get("limit").and_then(Value::as_i64).unwrap_or(10).max(0) as usize;
                let start = opt_str(&args, "start_date");
                let end = opt_str(&args, "end_date");
                client
                    .top_customers_by_revenue(limit, start.as_deref(), end.as_deref())
                    .await
            },
        )
        .tool(
            "get_tasks_due_this_week",
            "Timesheet tasks dated within the next seven days",
            super::empty_schema(),
            |client, _args| async move { client.tasks_due_this_week().await },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete_and_paired() {
        let module = module();
        assert_eq!(module.definitions.len(), 7);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }

    #[test]
    fn date_range_reports_require_both_bounds() {
        let schema = date_range_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 2);
    }
}
