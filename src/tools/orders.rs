//! Order (kb_order) tools, including conversion into deliveries and
//! invoices.

use serde_json::{json, Map, Value};

use super::{id_schema, object_schema, page_query, paged_schema, req_i64, req_str};
use crate::client::build_search_criteria;
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("orders")
        .tool(
            "list_orders",
            "List orders with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/kb_order{}", page_query(&args))).await
            },
        )
        .tool(
            "get_order",
            "Fetch a single order by its ID",
            id_schema("order_id", "Order ID"),
            |client, args| async move {
                let id = req_i64(&args, "order_id")?;
                client.get(&format!("/kb_order/{id}")).await
            },
        )
        .tool(
            "create_order",
            "Create an order for a contact",
            object_schema(
                json!({
                    "contact_id": { "type": "integer", "description": "Ordering contact" },
                    "title": { "type": "string" },
                    "positions": {
                        "type": "array",
                        "description": "Order line items",
                        "items": { "type": "object" },
                    },
                }),
                &["contact_id"],
            ),
            |client, args| async move { client.post("/kb_order", &args).await },
        )
        .tool(
            "search_orders",
            "Search orders by field filters; string values match partially",
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
                client.search("/kb_order", &build_search_criteria(&filters)).await
            },
        )
        .tool(
            "search_orders_by_customer",
            "Find all orders for a customer by name, resolving contacts first",
            object_schema(
                json!({ "customer_name": { "type": "string", "description": "Customer name fragment" } }),
                &["customer_name"],
            ),
            |client, args| async move {
                let name = req_str(&args, "customer_name")?;
                let contacts = client.search_contacts_by_name(&name).await?;
                let contacts = contacts.as_array().cloned().unwrap_or_default();
                if contacts.is_empty() {
                    return Ok(json!({
                        "orders": [],
                        "contacts_found": 0,
                        "searched_name": name,
                    }));
                }
                let mut orders = Vec::new();
                for contact in &contacts {
                    if let Some(id) = contact.get("id").and_then(Value::as_i64) {
                        let found = client
                            .search(
                                "/kb_order",
                                &json!([{ "field": "contact_id", "value": id, "criteria": "=" }]),
                            )
                            .await?;
                        if let Some(items) = found.as_array() {
                            orders.extend(items.iter().cloned());
                        }
                    }
                }
                Ok(json!({
                    "orders": orders,
                    "contacts_found": contacts.len(),
                    "searched_name": name,
                }))
            },
        )
        .tool(
            "create_delivery_from_order",
            "Create a delivery note from an order",
            id_schema("order_id", "Order ID"),
            |client, args| async move {
                let id = req_i64(&args, "order_id")?;
                client.post_action(&format!("/kb_order/{id}/create_delivery")).await
            },
        )
        .tool(
            "create_invoice_from_order",
            "Create an invoice from an order",
            id_schema("order_id", "Order ID"),
            |client, args| async move {
                let id = req_i64(&args, "order_id")?;
                client.post_action(&format!("/kb_order/{id}/create_invoice")).await
            },
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
}
