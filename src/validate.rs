//! Declarative argument validation for tool input schemas.
//!
//! Tool schemas are plain JSON objects in the JSON Schema subset the catalog
//! actually uses: `type: object` with `properties`, `required`, per-property
//! `type`/`enum`/`default`, and nested objects and arrays. Validation runs
//! once at the dispatch boundary, collects every issue instead of stopping
//! at the first, injects declared defaults, and coerces integral floats to
//! integers. Unknown keys pass through untouched so callers can send fields
//! the catalog has not modeled yet.

use serde_json::{Map, Value};

use crate::error::{McpError, McpResult};

/// A single field-level validation issue.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Issue {
    /// Dotted path to the failing field, `"(root)"` for the top level.
    pub field: String,
    pub message: String,
}

/// Validates `args` against `schema`, returning the (possibly amended)
/// arguments or a VALIDATION_ERROR listing every failing field.
pub fn validate_args(schema: &Value, args: Value) -> McpResult<Value> {
    let mut issues = Vec::new();
    let validated = check_value(schema, args, "(root)", &mut issues);
    if issues.is_empty() {
        Ok(validated)
    } else {
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        Err(McpError::validation(
            format!("invalid arguments for fields: {}", fields.join(", ")),
            Some(serde_json::json!({ "issues": issues })),
        ))
    }
}

fn check_value(schema: &Value, value: Value, path: &str, issues: &mut Vec<Issue>) -> Value {
    let declared = schema.get("type").and_then(Value::as_str);

    let value = match (declared, value) {
        // Integral floats arrive from JSON tooling that has no integer type.
        (Some("integer"), Value::Number(n)) => match coerce_integer(&n) {
            Some(coerced) => Value::Number(coerced),
            None => {
                issues.push(Issue {
                    field: path.to_string(),
                    message: format!("expected integer, got {n}"),
                });
                Value::Number(n)
            }
        },
        (Some(expected), value) if !type_matches(expected, &value) => {
            issues.push(Issue {
                field: path.to_string(),
                message: format!("expected {expected}, got {}", type_name(&value)),
            });
            return value;
        }
        (_, value) => value,
    };

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(&value) {
            issues.push(Issue {
                field: path.to_string(),
                message: format!(
                    "must be one of {}",
                    allowed
                        .iter()
                        .map(Value::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            });
        }
    }

    match (declared, value) {
        (Some("object"), Value::Object(map)) => {
            Value::Object(check_object(schema, map, path, issues))
        }
        (Some("array"), Value::Array(items)) => {
            if let Some(item_schema) = schema.get("items") {
                Value::Array(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| {
                            check_value(item_schema, item, &format!("{path}[{i}]"), issues)
                        })
                        .collect(),
                )
            } else {
                Value::Array(items)
            }
        }
        (_, value) => value,
    }
}

fn check_object(
    schema: &Value,
    mut map: Map<String, Value>,
    path: &str,
    issues: &mut Vec<Issue>,
) -> Map<String, Value> {
    let properties = schema.get("properties").and_then(Value::as_object);
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    for name in &required {
        if !map.contains_key(*name) {
            let has_default = properties
                .and_then(|p| p.get(*name))
                .map(|s| s.get("default").is_some())
                .unwrap_or(false);
            if !has_default {
                issues.push(Issue {
                    field: field_path(path, name),
                    message: "required field is missing".to_string(),
                });
            }
        }
    }

    if let Some(properties) = properties {
        for (name, prop_schema) in properties {
            match map.remove(name) {
                Some(value) => {
                    let checked =
                        check_value(prop_schema, value, &field_path(path, name), issues);
                    map.insert(name.clone(), checked);
                }
                None => {
                    if let Some(default) = prop_schema.get("default") {
                        map.insert(name.clone(), default.clone());
                    }
                }
            }
        }
    }

    map
}

fn field_path(parent: &str, name: &str) -> String {
    if parent == "(root)" {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn coerce_integer(n: &serde_json::Number) -> Option<serde_json::Number> {
    if n.is_i64() || n.is_u64() {
        return Some(n.clone());
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(serde_json::Number::from(f as i64))
    } else {
        None
    }
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "contact_id": { "type": "integer" },
                "limit": { "type": "integer", "default": 100 },
                "status": { "type": "string", "enum": ["open", "paid"] },
            },
            "required": ["contact_id"],
        })
    }

    #[test]
    fn injects_defaults_and_passes_unknown_keys() {
        let out = validate_args(&schema(), json!({"contact_id": 5, "extra": true})).unwrap();
        assert_eq!(out["limit"], 100);
        assert_eq!(out["extra"], true);
    }

    #[test]
    fn coerces_integral_floats() {
        let out = validate_args(&schema(), json!({"contact_id": 5.0})).unwrap();
        assert!(out["contact_id"].is_i64());
        assert_eq!(out["contact_id"], 5);
    }

    #[test]
    fn collects_every_issue() {
        let err = validate_args(&schema(), json!({"status": "draft", "limit": "ten"}))
            .unwrap_err();
        let issues = err.details.as_ref().unwrap()["issues"].as_array().unwrap().clone();
        let fields: Vec<&str> = issues
            .iter()
            .map(|i| i["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"contact_id"));
        assert!(fields.contains(&"status"));
        assert!(fields.contains(&"limit"));
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn fractional_float_is_not_an_integer() {
        let err = validate_args(&schema(), json!({"contact_id": 5.5})).unwrap_err();
        assert!(err.message.contains("contact_id"));
    }

    #[test]
    fn nested_objects_are_checked_recursively() {
        let schema = json!({
            "type": "object",
            "properties": {
                "positions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": { "amount": { "type": "number" } },
                        "required": ["amount"],
                    },
                },
            },
        });
        let err = validate_args(&schema, json!({"positions": [{"amount": 1.5}, {}]}))
            .unwrap_err();
        let issues = &err.details.as_ref().unwrap()["issues"];
        assert_eq!(issues[0]["field"], "positions[1].amount");
    }

    #[test]
    fn missing_required_with_default_is_filled_not_flagged() {
        let schema = json!({
            "type": "object",
            "properties": { "limit": { "type": "integer", "default": 50 } },
            "required": ["limit"],
        });
        let out = validate_args(&schema, json!({})).unwrap();
        assert_eq!(out["limit"], 50);
    }
}
