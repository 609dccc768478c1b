//! File metadata tools and the additional addresses kept on contacts.
//! Binary upload is out of scope for this JSON gateway; download returns
//! the base64 payload bexio serves.

use serde_json::json;

use super::{body_without, id_schema, object_schema, page_query, paged_schema, req_i64};
use crate::registry::DomainModule;

pub fn module() -> DomainModule {
    DomainModule::new("files")
        .tool(
            "list_files",
            "List uploaded files with pagination",
            paged_schema(),
            |client, args| async move {
                client.get(&format!("/file{}", page_query(&args))).await
            },
        )
        .tool(
            "get_file",
            "Fetch metadata of a single file",
            id_schema("file_id", "File ID"),
            |client, args| async move {
                let id = req_i64(&args, "file_id")?;
                client.get(&format!("/file/{id}")).await
            },
        )
        .tool(
            "download_file",
            "Download a file's content (base64 encoded)",
            id_schema("file_id", "File ID"),
            |client, args| async move {
                let id = req_i64(&args, "file_id")?;
                client.get(&format!("/file/{id}/download")).await
            },
        )
        .tool(
            "update_file",
            "Update metadata of a file",
            object_schema(
                json!({
                    "file_id": { "type": "integer", "description": "File ID" },
                    "name": { "type": "string" },
                }),
                &["file_id"],
            ),
            |client, args| async move {
                let id = req_i64(&args, "file_id")?;
                let body = body_without(&args, &["file_id"]);
                client.post(&format!("/file/{id}"), &body).await
            },
        )
        .tool(
            "delete_file",
            "Delete a file",
            id_schema("file_id", "File ID"),
            |client, args| async move {
                let id = req_i64(&args, "file_id")?;
                client.delete(&format!("/file/{id}")).await
            },
        )
        .tool(
            "list_additional_addresses",
            "List additional addresses of a contact",
            id_schema("contact_id", "Contact ID"),
            |client, args| async move {
                let contact = req_i64(&args, "contact_id")?;
                client
                    .get(&format!("/contact/{contact}/additional_address"))
                    .await
            },
        )
        .tool(
            "get_additional_address",
            "Fetch a single additional address of a contact",
            object_schema(
                json!({
                    "contact_id": { "type": "integer", "description": "Contact ID" },
                    "address_id": { "type": "integer", "description": "Address ID" },
                }),
                &["contact_id", "address_id"],
            ),
            |client, args| async move {
                let contact = req_i64(&args, "contact_id")?;
                let address = req_i64(&args, "address_id")?;
                client
                    .get(&format!("/contact/{contact}/additional_address/{address}"))
                    .await
            },
        )
        .tool(
            "create_additional_address",
            "Add an additional address to a contact",
            object_schema(
                json!({
                    "contact_id": { "type": "integer", "description": "Contact ID" },
                    "name": { "type": "string", "description": "Address label" },
                    "address": { "type": "string" },
                    "postcode": { "type": "string" },
                    "city": { "type": "string" },
                }),
                &["contact_id", "name"],
            ),
            |client, args| async move {
                let contact = req_i64(&args, "contact_id")?;
                let body = body_without(&args, &["contact_id"]);
                client
                    .post(&format!("/contact/{contact}/additional_address"), &body)
                    .await
            },
        )
        .tool(
            "delete_additional_address",
            "Delete an additional address from a contact",
            object_schema(
                json!({
                    "contact_id": { "type": "integer", "description": "Contact ID" },
                    "address_id": { "type": "integer", "description": "Address ID" },
                }),
                &["contact_id", "address_id"],
            ),
            |client, args| async move {
                let contact = req_i64(&args, "contact_id")?;
                let address = req_i64(&args, "address_id")?;
                client
                    .delete(&format!("/contact/{contact}/additional_address/{address}"))
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
        assert_eq!(module.definitions.len(), 9);
        for def in &module.definitions {
            assert!(module.handlers.contains_key(&def.name), "{} unpaired", def.name);
        }
    }
}
