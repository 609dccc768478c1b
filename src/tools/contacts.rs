//! Contact tools: CRUD plus the name and number lookups agents reach for
//! most often.

use serde_json::{json, Map, Value};

use super::{
    body_without, id_schema, object_schema, page_query, paged_schema, req_i64, req_str,
};
use crate::client::build_search_criteria;
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("contacts")
        .tool(
            "list_contacts",
            "List contacts with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/contact{}", page_query(&args))).await
            },
        )
        .tool(
            "get_contact",
            "Fetch a single contact by its ID",
            id_schema("contact_id", "Contact ID"),
            |client, args| async move {
                let id = req_i64(&args, "contact_id")?;
                client.get(&format!("/contact/{id}")).await
            },
        )
        .tool(
            "search_contacts",
            "Search contacts by name (partial match)",
            object_schema(
                json!({ "name": { "type": "string", "description": "Name fragment to search for" } }),
                &["name"],
            ),
            |client, args| async move {
                let name = req_str(&args, "name")?;
                client.search_contacts_by_name(&name).await
            },
        )
        .tool(
            "advanced_search_contacts",
            "Search contacts by arbitrary field filters; string values match partially",
            object_schema(
                json!({ "filters": {
                    "type": "object",
                    "description": "Field/value pairs, e.g. {\"city\": \"Zurich\"}",
                } }),
                &["filters"],
            ),
            |client, args| async move {
                let filters = args
                    .get("filters")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_else(Map::new);
                client.search("/contact", &build_search_criteria(&filters)).await
            },
        )
        .tool(
            "find_contact_by_number",
            "Find exactly one contact by its contact number",
            object_schema(
                json!({ "contact_number": { "type": "string", "description": "Exact contact number" } }),
                &["contact_number"],
            ),
            |client, args| async move {
                let number = req_str(&args, "contact_number")?;
                client.find_contact_by_number(&number).await
            },
        )
        .tool(
            "find_contact_by_name",
            "Find the first contact matching a name",
            object_schema(
                json!({ "name": { "type": "string", "description": "Name to look up" } }),
                &["name"],
            ),
            |client, args| async move {
                let name = req_str(&args, "name")?;
                client.find_contact_by_name(&name).await
            },
        )
        .tool(
            "create_contact",
            "Create a new contact. Pass any additional bexio contact fields directly",
            object_schema(
                json!({
                    "name_1": { "type": "string", "description": "Company name or last name" },
                    "name_2": { "type": "string", "description": "First name (for persons)" },
                    "contact_type_id": {
                        "type": "integer",
                        "description": "1 = company, 2 = person",
                        "default": 1,
                    },
                    "mail": { "type": "string", "description": "Email address" },
                }),
                &["name_1"],
            ),
            |client, args| async move { client.post("/contact", &args).await },
        )
        .tool(
            "update_contact",
            "Update fields of an existing contact",
            object_schema(
                json!({
                    "contact_id": { "type": "integer", "description": "Contact ID" },
                    "name_1": { "type": "string" },
                    "name_2": { "type": "string" },
                    "mail": { "type": "string" },
                }),
                &["contact_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "contact_id")?;
                let body = body_without(&args, &["contact_id"]);
                client.post(&format!("/contact/{id}"), &body).await
            },
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

    #[test]
    fn update_body_drops_the_routing_id() {
        let body = body_without(&json!({"contact_id": 3, "mail": "x@y.ch"}), &["contact_id"]);
        assert!(body.get("contact_id").is_none());
        assert_eq!(body["mail"], "x@y.ch");
    }
}
