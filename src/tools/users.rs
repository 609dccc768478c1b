//! User tools: the authenticated user and fictional (placeholder) users.

use serde_json::json;

use super::{body_without, id_schema, object_schema, page_query, paged_schema, req_i64};
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("users")
        .tool(
            "get_current_user",
            "Fetch the user the API token belongs to",
            super::empty_schema(),
            |client, _args| async move { client.get("/user/me").await },
        )
        .tool(
            "list_fictional_users",
            "List fictional users",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/fictional_user{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "get_fictional_user",
            "Fetch a single fictional user",
            id_schema("user_id", "Fictional user ID"),
            |client, args| async move {
                let id = req_i64(&args, "user_id")?;
                client.get(&format!("/fictional_user/{id}")).await
            },
        )
        .tool(
            "create_fictional_user",
            "Create a fictional user",
            object_schema(
                json!({
                    "firstname": { "type": "string" },
                    "lastname": { "type": "string" },
                    "email": { "type": "string" },
                    "title_id": { "type": "integer" },
                }),
                &["firstname", "lastname", "email"],
            ),
            |client, args| async move { client.post("/fictional_user", &args).await },
        )
        .tool(
            "update_fictional_user",
            "Update a fictional user",
            object_schema(
                json!({
                    "user_id": { "type": "integer", "description": "Fictional user ID" },
                    "firstname": { "type": "string" },
                    "lastname": { "type": "string" },
                    "email": { "type": "string" },
                }),
                &["user_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "user_id")?;
                let body = body_without(&args, &["user_id"]);
                client.post(&format!("/fictional_user/{id}"), &body).await
            },
        )
        .tool(
            "delete_fictional_user",
            "Delete a fictional user",
            id_schema("user_id", "Fictional user ID"),
            |client, args| async move {
                let id = req_i64(&args, "user_id")?;
                client.delete(&format!("/fictional_user/{id}")).await
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete_and_paired() {
        let module = module();
        assert_eq!(module.definitions.len(), 6);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
