//! Quote (kb_offer) tools, including conversion into orders and invoices.

use serde_json::{json, Map, Value};

use super::{
    body_without, id_schema, object_schema, page_query, paged_schema, req_i64, req_str,
};
use crate::client::build_search_criteria;
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("quotes")
        .tool(
            "list_quotes",
            "List quotes with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/kb_offer{}", page_query(&args))).await
            },
        )
        .tool(
            "get_quote",
            "Fetch a single quote by its ID",
            id_schema("quote_id", "Quote ID"),
            |client, args| async move {
                let id = req_i64(&args, "quote_id")?;
                client.get(&format!("/kb_offer/{id}")).await
            },
        )
        .tool(
            "create_quote",
            "Create a draft quote for a contact",
            object_schema(
                json!({
                    "contact_id": { "type": "integer", "description": "Recipient contact" },
                    "title": { "type": "string" },
                    "positions": {
                        "type": "array",
                        "description": "Quote line items",
                        "items": { "type": "object" },
                    },
                }),
                &["contact_id"],
            ),
            |client, args| async move { client.post("/kb_offer", &args).await },
        )
        .tool(
            "search_quotes",
            "Search quotes by field filters; string values match partially",
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
                client.search("/kb_offer", &build_search_criteria(&filters)).await
            },
        )
        .tool(
            "search_quotes_by_customer",
            "Find all quotes for a customer by name, resolving contacts first",
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
                        "quotes": [],
                        "contacts_found": 0,
                        "searched_name": name,
                    }));
                }
                let mut quotes = Vec::new();
                for contact in &contacts {
                    if let Some(id) = contact.get("id").and_then(Value::as_i64) {
                        let found = client
                            .search(
                                "/kb_offer",
                                &json!([{ "field": "contact_id", "value": id, "criteria": "=" }]),
                            )
                            .await?;
                        if let Some(items) = found.as_array() {
                            quotes.extend(items.iter().cloned());
                        }
                    }
                }
                Ok(json!({
                    "quotes": quotes,
                    "contacts_found": contacts.len(),
                    "searched_name": name,
                }))
            },
        )
        .tool(
            "issue_quote",
            "Issue a draft quote",
            id_schema("quote_id", "Quote ID"),
            |client, args| async move {
                let id = req_i64(&args, "quote_id")?;
                client.post_action(&format!("/kb_offer/{id}/issue")).await
            },
        )
        .tool(
            "accept_quote",
            "Mark a quote as accepted by the customer",
            id_schema("quote_id", "Quote ID"),
            |client, args| async move {
                let id = req_i64(&args, "quote_id")?;
                client.post_action(&format!("/kb_offer/{id}/accept")).await
            },
        )
        .tool(
            "decline_quote",
            "Mark a quote as declined by the customer",
            id_schema("quote_id", "Quote ID"),
            |client, args| async move {
                let id = req_i64(&args, "quote_id")?;
                client.post_action(&format!("/kb_offer/{id}/decline")).await
            },
        )
        .tool(
            "send_quote",
            "Send a quote by email through bexio",
            object_schema(
                json!({
                    "quote_id": { "type": "integer", "description": "Quote ID" },
                    "recipient_email": { "type": "string" },
                    "subject": { "type": "string" },
                    "message": { "type": "string" },
                }),
                &["quote_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "quote_id")?;
                let body = body_without(&args, &["quote_id"]);
                client.post(&format!("/kb_offer/{id}/send"), &body).await
            },
        )
        .tool(
            "create_order_from_quote",
            "Convert an accepted quote into an order",
            id_schema("quote_id", "Quote ID"),
            |client, args| async move {
                let id = req_i64(&args, "quote_id")?;
                client.post_action(&format!("/kb_offer/{id}/create_order")).await
            },
        )
        .tool(
            "create_invoice_from_quote",
            "Convert an accepted quote directly into an invoice",
            id_schema("quote_id", "Quote ID"),
            |client, args| async move {
                let id = req_i64(&args, "quote_id")?;
                client.post_action(&format!("/kb_offer/{id}/create_invoice")).await
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
