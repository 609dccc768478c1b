//! Delivery note (kb_delivery) tools.

use serde_json::{json, Map, Value};

use super::{id_schema, object_schema, page_query, paged_schema, req_i64};
use crate::client::build_search_criteria;
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("deliveries")
        .tool(
            "list_deliveries",
            "List delivery notes with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/kb_delivery{}", page_query(&args))).await
            },
        )
        .tool(
            "get_delivery",
            "Fetch a single delivery note by its ID",
            id_schema("delivery_id", "Delivery ID"),
            |client, args| async move {
                let id = req_i64(&args, "delivery_id")?;
                client.get(&format!("/kb_delivery/{id}")).await
            },
        )
        .tool(
            "issue_delivery",
            "Issue a draft delivery note",
            id_schema("delivery_id", "Delivery ID"),
            |client, args| async move {
                let id = req_i64(&args, "delivery_id")?;
                client.post_action(&format!("/kb_delivery/{id}/issue")).await
            },
        )
        .tool(
            "search_deliveries",
            "Search delivery notes by field filters; string values match partially",
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
                client.search("/kb_delivery", &build_search_criteria(&filters)).await
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
