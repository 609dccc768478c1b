//! Article (item) and tax tools. Taxes live on the 3.0 API.

use serde_json::json;

use super::{id_schema, object_schema, page_query, paged_schema, req_i64};
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("items")
        .tool(
            "list_items",
            "List articles (products/services) with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/article{}", page_query(&args))).await
            },
        )
        .tool(
            "get_item",
            "Fetch a single article by its ID",
            id_schema("item_id", "Article ID"),
            |client, args| async move {
                let id = req_i64(&args, "item_id")?;
                client.get(&format!("/article/{id}")).await
            },
        )
        .tool(
            "create_item",
            "Create an article (product or service)",
            object_schema(
                json!({
                    "intern_name": { "type": "string", "description": "Internal article name" },
                    "intern_code": { "type": "string", "description": "Internal article code" },
                    "sale_price": { "type": "number" },
                }),
                &["intern_name"],
            ),
            |client, args| async move { client.post("/article", &args).await },
        )
        .tool(
            "list_taxes",
            "List tax rates",
            object_schema(
                json!({ "scope": {
                    "type": "string",
                    "description": "Optional filter: active or inactive",
                    "enum": ["active", "inactive"],
                } }),
                &[],
            ),
            |client, args| async move {
                match args.get("scope").and_then(serde_json::Value::as_str) {
                    Some(scope) => client.get_v3(&format!("/taxes?scope={scope}")).await,
                    None => client.get_v3("/taxes").await,
                }
            },
        )
        .tool(
            "get_tax",
            "Fetch a single tax rate by its ID",
            id_schema("tax_id", "Tax ID"),
            |client, args| async move {
                let id = req_i64(&args, "tax_id")?;
                client.get_v3(&format!("/taxes/{id}")).await
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete_and_paired() {
        let module = module();
        assert_eq!(module.definitions.len(), 5);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
