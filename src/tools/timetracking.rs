//! Time tracking tools: timesheets, business activities and communication
//! types.

use serde_json::{json, Map, Value};

use super::{id_schema, object_schema, page_query, paged_schema, req_i64};
use crate::client::build_search_criteria;
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("timetracking")
        .tool(
            "list_timesheets",
            "List timesheet entries with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/timesheet{}", page_query(&args))).await
            },
        )
        .tool(
            "get_timesheet",
            "Fetch a single timesheet entry by its ID",
            id_schema("timesheet_id", "Timesheet ID"),
            |client, args| async move {
                let id = req_i64(&args, "timesheet_id")?;
                client.get(&format!("/timesheet/{id}")).await
            },
        )
        .tool(
            "create_timesheet",
            "Record a timesheet entry",
            object_schema(
                json!({
                    "user_id": { "type": "integer", "description": "Tracking user" },
                    "client_service_id": { "type": "integer", "description": "Business activity" },
                    "date": { "type": "string", "description": "Entry date (YYYY-MM-DD)" },
                    "duration": { "type": "string", "description": "Duration, e.g. \"02:30\"" },
                    "pr_project_id": { "type": "integer", "description": "Optional project" },
                    "text": { "type": "string" },
                }),
                &["user_id", "client_service_id"],
            ),
            |client, args| async move { client.post("/timesheet", &args).await },
        )
        .tool(
            "delete_timesheet",
            "Delete a timesheet entry",
            id_schema("timesheet_id", "Timesheet ID"),
            |client, args| async move {
                let id = req_i64(&args, "timesheet_id")?;
                client.delete(&format!("/timesheet/{id}")).await
            },
        )
        .tool(
            "search_timesheets",
            "Search timesheet entries by field filters",
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
                client.search("/timesheet", &build_search_criteria(&filters)).await
            },
        )
        .tool(
            "list_timesheet_statuses",
            "List timesheet statuses",
            super::empty_schema(),
            |client, _args| async move { client.get("/timesheet_status").await },
        )
        .tool(
            "list_business_activities",
            "List business activities (client services)",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/client_service{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "get_business_activity",
            "Fetch a single business activity",
            id_schema("activity_id", "Business activity ID"),
            |client, args| async move {
                let id = req_i64(&args, "activity_id")?;
                client.get(&format!("/client_service/{id}")).await
            },
        )
        .tool(
            "create_business_activity",
            "Create a business activity",
            object_schema(
                json!({
                    "name": { "type": "string", "description": "Activity name" },
                    "default_is_billable": { "type": "boolean" },
                }),
                &["name"],
            ),
            |client, args| async move { client.post("/client_service", &args).await },
        )
        .tool(
            "list_communication_types",
            "List communication types",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/communication_kind{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "get_communication_type",
            "Fetch a single communication type",
            id_schema("type_id", "Communication type ID"),
            |client, args| async move {
                let id = req_i64(&args, "type_id")?;
                client.get(&format!("/communication_kind/{id}")).await
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete_and_paired() {
        let module = module();
        assert_eq!(module.definitions.len(), 11);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
