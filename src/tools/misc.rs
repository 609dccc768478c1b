//! Comments, contact relations and the ping tool.

use serde_json::{json, Map, Value};

use super::{body_without, id_schema, object_schema, page_query, paged_schema, req_i64};
use crate::client::build_search_criteria;
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("misc")
        .tool(
            "ping",
            "Liveness check; returns pong without calling bexio",
            super::empty_schema(),
            |_client, _args| async move { Ok(json!("pong")) },
        )
        .tool(
            "list_comments",
            "List comments with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/comment{}", page_query(&args))).await
            },
        )
        .tool(
            "get_comment",
            "Fetch a single comment",
            id_schema("comment_id", "Comment ID"),
            |client, args| async move {
                let id = req_i64(&args, "comment_id")?;
                client.get(&format!("/comment/{id}")).await
            },
        )
        .tool(
            "create_comment",
            "Create a comment on a document",
            object_schema(
                json!({
                    "text": { "type": "string", "description": "Comment body" },
                    "user_id": { "type": "integer" },
                    "is_public": { "type": "boolean", "default": false },
                }),
                &["text", "user_id"],
            ),
            |client, args| async move { client.post("/comment", &args).await },
        )
        .tool(
            "list_contact_relations",
            "List contact relations",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/contact_relation{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "get_contact_relation",
            "Fetch a single contact relation",
            id_schema("relation_id", "Contact relation ID"),
            |client, args| async move {
                let id = req_i64(&args, "relation_id")?;
                client.get(&format!("/contact_relation/{id}")).await
            },
        )
        .tool(
            "create_contact_relation",
            "Create a relation between two contacts",
            object_schema(
                json!({
                    "contact_id": { "type": "integer", "description": "Parent contact" },
                    "contact_sub_id": { "type": "integer", "description": "Related contact" },
                    "description": { "type": "string" },
                }),
                &["contact_id", "contact_sub_id"],
            ),
            |client, args| async move { client.post("/contact_relation", &args).await },
        )
        .tool(
            "update_contact_relation",
            "Update a contact relation",
            object_schema(
                json!({
                    "relation_id": { "type": "integer", "description": "Contact relation ID" },
                    "description": { "type": "string" },
                }),
                &["relation_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "relation_id")?;
                let body = body_without(&args, &["relation_id"]);
                client.post(&format!("/contact_relation/{id}"), &body).await
            },
        )
        .tool(
            "delete_contact_relation",
            "Delete a contact relation",
            id_schema("relation_id", "Contact relation ID"),
            |client, args| async move {
                let id = req_i64(&args, "relation_id")?;
                client.delete(&format!("/contact_relation/{id}")).await
            },
        )
        .tool(
            "search_contact_relations",
            "Search contact relations by field filters",
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
                client
                    .search("/contact_relation", &build_search_criteria(&filters))
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
        assert_eq!(module.definitions.len(), 10);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
