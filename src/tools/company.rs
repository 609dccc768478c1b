//! Company profile, permissions and payment type tools.

use serde_json::json;

use super::{id_schema, object_schema, page_query, paged_schema, req_i64};
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("company")
        .tool(
            "get_company_profile",
            "Fetch the company profile",
            super::empty_schema(),
            |client, _args| async move {
                // The endpoint returns a one-element array.
                let profiles = client.get("/company_profile").await?;
                Ok(profiles
                    .as_array()
                    .and_then(|a| a.first())
                    .cloned()
                    .unwrap_or(profiles))
            },
        )
        .tool(
            "update_company_profile",
            "Update the company profile",
            object_schema(
                json!({
                    "name": { "type": "string" },
                    "address": { "type": "string" },
                    "mail": { "type": "string" },
                }),
                &[],
            ),
            |client, args| async move { client.post("/company_profile", &args).await },
        )
        .tool(
            "list_permissions",
            "List the permissions of the current API token",
            super::empty_schema(),
            |client, _args| async move { client.get("/permission").await },
        )
        .tool(
            "list_payment_types",
            "List payment types",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/payment_type{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "get_payment_type",
            "Fetch a single payment type",
            id_schema("payment_type_id", "Payment type ID"),
            |client, args| async move {
                let id = req_i64(&args, "payment_type_id")?;
                client.get(&format!("/payment_type/{id}")).await
            },
        )
        .tool(
            "create_payment_type",
            "Create a payment type",
            object_schema(
                json!({ "name": { "type": "string", "description": "Payment type name" } }),
                &["name"],
            ),
            |client, args| async move { client.post("/payment_type", &args).await },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn catalog_is_complete_and_paired() {
        let module = module();
        assert_eq!(module.definitions.len(), 6);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }

    #[test]
    fn profile_schemas_are_objects() {
        for def in module().definitions {
            assert_eq!(def.input_schema["type"], Value::from("object"));
        }
    }
}
