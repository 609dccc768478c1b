//! Banking tools: bank accounts, currencies and payment orders (IBAN and
//! Swiss QR).

use serde_json::json;

use super::{body_without, id_schema, object_schema, page_query, paged_schema, req_i64};
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("banking")
        .tool(
            "list_bank_accounts",
            "List bank accounts",
            paged_schema(),
            |client, args| async move {
                client
                    .get(&format!("/bank_account{}", page_query(&args)))
                    .await
            },
        )
        .tool(
            "get_bank_account",
            "Fetch a single bank account",
            id_schema("account_id", "Bank account ID"),
            |client, args| async move {
                let id = req_i64(&args, "account_id")?;
                client.get(&format!("/bank_account/{id}")).await
            },
        )
        .tool(
            "list_currencies",
            "List currencies",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/currency{}", page_query(&args))).await
            },
        )
        .tool(
            "get_currency",
            "Fetch a single currency",
            id_schema("currency_id", "Currency ID"),
            |client, args| async move {
                let id = req_i64(&args, "currency_id")?;
                client.get(&format!("/currency/{id}")).await
            },
        )
        .tool(
            "create_currency",
            "Create a currency",
            object_schema(
                json!({
                    "name": { "type": "string", "description": "ISO code, e.g. EUR" },
                    "round_factor": { "type": "number", "default": 0.05 },
                }),
                &["name"],
            ),
            |client, args| async move { client.post("/currency", &args).await },
        )
        .tool(
            "update_currency",
            "Update a currency",
            object_schema(
                json!({
                    "currency_id": { "type": "integer", "description": "Currency ID" },
                    "round_factor": { "type": "number" },
                }),
                &["currency_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "currency_id")?;
                let body = body_without(&args, &["currency_id"]);
                client.patch(&format!("/currency/{id}"), &body).await
            },
        )
        .tool(
            "delete_currency",
            "Delete a currency",
            id_schema("currency_id", "Currency ID"),
            |client, args| async move {
                let id = req_i64(&args, "currency_id")?;
                client.delete(&format!("/currency/{id}")).await
            },
        )
        .tool(
            "create_iban_payment",
            "Create an IBAN payment order",
            object_schema(
                json!({
                    "bank_account_id": { "type": "integer" },
                    "iban": { "type": "string" },
                    "amount": { "type": "number" },
                    "execution_date": { "type": "string", "description": "YYYY-MM-DD" },
                    "recipient": { "type": "object" },
                }),
                &["bank_account_id", "iban", "amount"],
            ),
            |client, args| async move { client.post("/iban_payment", &args).await },
        )
        .tool(
            "get_iban_payment",
            "Fetch a single IBAN payment order",
            id_schema("payment_id", "IBAN payment ID"),
            |client, args| async move {
                let id = req_i64(&args, "payment_id")?;
                client.get(&format!("/iban_payment/{id}")).await
            },
        )
        .tool(
            "update_iban_payment",
            "Update an IBAN payment order",
            object_schema(
                json!({
                    "payment_id": { "type": "integer", "description": "IBAN payment ID" },
                    "amount": { "type": "number" },
                    "execution_date": { "type": "string" },
                }),
                &["payment_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "payment_id")?;
                let body = body_without(&args, &["payment_id"]);
                client.patch(&format!("/iban_payment/{id}"), &body).await
            },
        )
        .tool(
            "create_qr_payment",
            "Create a Swiss QR payment order",
            object_schema(
                json!({
                    "bank_account_id": { "type": "integer" },
                    "amount": { "type": "number" },
                    "execution_date": { "type": "string", "description": "YYYY-MM-DD" },
                    "recipient": { "type": "object" },
                    "qr_reference_nr": { "type": "string" },
                }),
                &["bank_account_id", "amount"],
            ),
            |client, args| async move { client.post("/qr_payment", &args).await },
        )
        .tool(
            "get_qr_payment",
            "Fetch a single QR payment order",
            id_schema("payment_id", "QR payment ID"),
            |client, args| async move {
                let id = req_i64(&args, "payment_id")?;
                client.get(&format!("/qr_payment/{id}")).await
            },
        )
        .tool(
            "update_qr_payment",
            "Update a QR payment order",
            object_schema(
                json!({
                    "payment_id": { "type": "integer", "description": "QR payment ID" },
                    "amount": { "type": "number" },
                    "execution_date": { "type": "string" },
                }),
                &["payment_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "payment_id")?;
                let body = body_without(&args, &["payment_id"]);
                client.patch(&format!("/qr_payment/{id}"), &body).await
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete_and_paired() {
        let module = module();
        assert_eq!(module.definitions.len(), 13);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
