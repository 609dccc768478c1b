//! Accounting tools: chart of accounts, business/calendar years, manual
//! entries, VAT periods and the journal.

use serde_json::{json, Map, Value};

use super::{
    body_without, id_schema, object_schema, opt_str, page_query, paged_schema, req_i64,
};
use crate::client::build_search_criteria;
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("accounting")
        .tool(
            "list_accounts",
            "List accounts from the chart of accounts",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/accounts{}", page_query(&args))).await
            },
        )
        .tool(
            "get_account",
            "Fetch a single account by its ID",
            id_schema("account_id", "Account ID"),
            |client, args| async move {
                let id = req_i64(&args, "account_id")?;
                client.get(&format!("/accounts/{id}")).await
            },
        )
        .tool(
            "create_account",
            "Create an account in the chart of accounts",
            object_schema(
                json!({
                    "account_no": { "type": "string", "description": "Account number" },
                    "name": { "type": "string", "description": "Account name" },
                    "account_group_id": { "type": "integer" },
                }),
                &["account_no", "name"],
            ),
            |client, args| async move { client.post("/accounts", &args).await },
        )
        .tool(
            "search_accounts",
            "Search accounts by field filters",
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
                client.search("/accounts", &build_search_criteria(&filters)).await
            },
        )
        .tool(
            "list_account_groups",
            "List account groups",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/account_groups{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "list_calendar_years",
            "List calendar years",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/calendar_year{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "get_calendar_year",
            "Fetch a single calendar year",
            id_schema("year_id", "Calendar year ID"),
            |client, args| async move {
                let id = req_i64(&args, "year_id")?;
                client.get(&format!("/calendar_year/{id}")).await
            },
        )
        .tool(
            "list_business_years",
            "List business years",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/business_year{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "list_manual_entries",
            "List manual accounting entries",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/manual_entry{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "get_manual_entry",
            "Fetch a single manual entry",
            id_schema("entry_id", "Manual entry ID"),
            |client, args| async move {
                let id = req_i64(&args, "entry_id")?;
                client.get(&format!("/manual_entry/{id}")).await
            },
        )
        .tool(
            "create_manual_entry",
            "Create a manual accounting entry",
            object_schema(
                json!({
                    "type": { "type": "string", "description": "Entry type, e.g. manual_single_entry" },
                    "date": { "type": "string", "description": "Booking date (YYYY-MM-DD)" },
                    "entries": {
                        "type": "array",
                        "description": "Debit/credit lines",
                        "items": { "type": "object" },
                    },
                }),
                &["date", "entries"],
            ),
            |client, args| async move { client.post("/manual_entry", &args).await },
        )
        .tool(
            "update_manual_entry",
            "Replace a manual accounting entry",
            object_schema(
                json!({
                    "entry_id": { "type": "integer", "description": "Manual entry ID" },
                    "date": { "type": "string" },
                    "entries": { "type": "array", "items": { "type": "object" } },
                }),
                &["entry_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "entry_id")?;
                let body = body_without(&args, &["entry_id"]);
                client.put(&format!("/manual_entry/{id}"), &body).await
            },
        )
        .tool(
            "delete_manual_entry",
            "Delete a manual accounting entry",
            id_schema("entry_id", "Manual entry ID"),
            |client, args| async move {
                let id = req_i64(&args, "entry_id")?;
                client.delete(&format!("/manual_entry/{id}")).await
            },
        )
        .tool(
            "list_vat_periods",
            "List VAT periods",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/vat_period{}", page_query(&args))).await
            },
        )
        .tool(
            "get_journal",
            "Fetch the accounting journal, optionally bounded by dates",
            object_schema(
                json!({
                    "from": { "type": "string", "description": "Start date (YYYY-MM-DD)" },
                    "to": { "type": "string", "description": "End date (YYYY-MM-DD)" },
                }),
                &[],
            ),
            |client, args| async move {
                let mut query = Vec::new();
                if let Some(from) = opt_str(&args, "from") {
                    query.push(("from".to_string(), from));
                }
                if let Some(to) = opt_str(&args, "to") {
                    query.push(("to".to_string(), to));
                }
                client.get_with_query("/journal", &query).await
            },
        )
}
