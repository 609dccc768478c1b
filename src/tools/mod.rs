//! The tool catalog, one module per business domain.
//!
//! Each module builds a [`DomainModule`] pairing every definition with its
//! handler. Handlers are thin: pull validated arguments, call the gateway,
//! return the payload. Anything needing more than one upstream request lives
//! on [`crate::client::BexioClient`] so several tools can share it.

use serde_json::{json, Value};

use crate::error::{McpError, McpResult};
use crate::registry::DomainModule;

pub mod accounting;
pub mod banking;
pub mod company;
pub mod contacts;
pub mod deliveries;
pub mod files;
pub mod invoices;
pub mod items;
pub mod misc;
pub mod orders;
pub mod payments;
pub mod payroll;
pub mod projects;
pub mod purchase;
pub mod quotes;
pub mod reference;
pub mod reminders;
pub mod reports;
pub mod timetracking;
pub mod users;

/// Every domain module, in catalog order.
pub fn all_modules() -> Vec<DomainModule> {
    vec![
        contacts::module(),
        invoices::module(),
        quotes::module(),
        orders::module(),
        deliveries::module(),
        items::module(),
        payments::module(),
        reminders::module(),
        projects::module(),
        timetracking::module(),
        accounting::module(),
        banking::module(),
        purchase::module(),
        payroll::module(),
        company::module(),
        reference::module(),
        users::module(),
        misc::module(),
        files::module(),
        reports::module(),
    ]
}

// ----- argument accessors (post-validation) --------------------------------

pub(crate) fn req_i64(args: &Value, field: &str) -> McpResult<i64> {
    args.get(field).and_then(Value::as_i64).ok_or_else(|| {
        McpError::validation(
            format!("{field} must be an integer"),
            Some(json!({ "issues": [{ "field": field, "message": "must be an integer" }] })),
        )
    })
}

pub(crate) fn opt_i64(args: &Value, field: &str) -> Option<i64> {
    args.get(field).and_then(Value::as_i64)
}

pub(crate) fn req_str(args: &Value, field: &str) -> McpResult<String> {
    args.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            McpError::validation(
                format!("{field} must be a string"),
                Some(json!({ "issues": [{ "field": field, "message": "must be a string" }] })),
            )
        })
}

pub(crate) fn opt_str(args: &Value, field: &str) -> Option<String> {
    args.get(field).and_then(Value::as_str).map(str::to_string)
}

/// `?limit=N&offset=M` from the (defaulted) paging arguments.
pub(crate) fn page_query(args: &Value) -> String {
    let limit = opt_i64(args, "limit").unwrap_or(100);
    let offset = opt_i64(args, "offset").unwrap_or(0);
    format!("?limit={limit}&offset={offset}")
}

/// Clones `args` with routing fields (ids already consumed into the URL)
/// removed, leaving the upstream request body.
pub(crate) fn body_without(args: &Value, fields: &[&str]) -> Value {
    let mut body = args.clone();
    if let Some(map) = body.as_object_mut() {
        for field in fields {
            map.remove(*field);
        }
    }
    body
}

// ----- schema builders -----------------------------------------------------

pub(crate) fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// Standard paging arguments with defaults the validator injects.
pub(crate) fn paged_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "limit": {
                "type": "integer",
                "description": "Maximum number of records to return",
                "default": 100,
            },
            "offset": {
                "type": "integer",
                "description": "Number of records to skip",
                "default": 0,
            },
        },
    })
}

/// Single required integer id.
pub(crate) fn id_schema(field: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            field: { "type": "integer", "description": description },
        },
        "required": [field],
    })
}

pub(crate) fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_domain_contributes_tools() {
        for module in all_modules() {
            assert!(
                !module.definitions.is_empty(),
                "domain {} has no tools",
                module.name
            );
        }
    }

    #[test]
    fn tool_names_are_unique_across_domains() {
        let mut seen = std::collections::HashSet::new();
        for module in all_modules() {
            for def in &module.definitions {
                assert!(
                    seen.insert(def.name.clone()),
                    "duplicate tool name: {}",
                    def.name
                );
            }
        }
    }

    #[test]
    fn page_query_uses_defaults_when_absent() {
        assert_eq!(page_query(&json!({})), "?limit=100&offset=0");
        assert_eq!(
            page_query(&json!({"limit": 20, "offset": 40})),
            "?limit=20&offset=40"
        );
    }
}
