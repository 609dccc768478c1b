//! Tool catalog: definitions paired with handlers, assembled at startup.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::BexioClient;
use crate::error::McpResult;

/// The future a handler returns.
pub type HandlerFuture = Pin<Box<dyn Future<Output = McpResult<Value>> + Send>>;

/// A tool implementation: shared gateway in, validated arguments in,
/// JSON payload or classified error out.
pub type ToolHandler = Arc<dyn Fn(Arc<BexioClient>, Value) -> HandlerFuture + Send + Sync>;

/// Catalog entry advertised through `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// One business domain's tools: parallel lists of definitions and handlers.
pub struct DomainModule {
    pub name: &'static str,
    pub definitions: Vec<ToolDefinition>,
    pub handlers: HashMap<String, ToolHandler>,
}

impl DomainModule {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            definitions: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Adds a definition and its handler together, keeping them paired by
    /// construction.
    pub fn tool<F, Fut>(
        mut self,
        name: &str,
        description: &str,
        input_schema: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(Arc<BexioClient>, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = McpResult<Value>> + Send + 'static,
    {
        self.definitions.push(ToolDefinition {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        });
        self.handlers.insert(
            name.to_string(),
            Arc::new(move |client, args| -> HandlerFuture { Box::pin(handler(client, args)) }),
        );
        self
    }

    /// Adds a definition without a handler. The registry logs and skips it,
    /// keeping the advertised catalog and the dispatchable set consistent.
    pub fn definition_only(mut self, name: &str, description: &str, input_schema: Value) -> Self {
        self.definitions.push(ToolDefinition {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        });
        self
    }
}

/// The assembled catalog, shared read-only after startup.
pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
    handlers: HashMap<String, ToolHandler>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Builds the full production catalog from every domain module.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for module in crate::tools::all_modules() {
            registry.register(module);
        }
        info!(tools = registry.definitions.len(), "tool registry assembled");
        registry
    }

    /// Merges a domain module in. A definition with no matching handler is
    /// logged and dropped rather than advertised as callable.
    pub fn register(&mut self, mut module: DomainModule) {
        for def in module.definitions {
            match module.handlers.remove(&def.name) {
                Some(handler) => {
                    self.handlers.insert(def.name.clone(), handler);
                    self.definitions.push(def);
                }
                None => {
                    warn!(
                        domain = module.name,
                        tool = %def.name,
                        "tool definition has no handler; skipping"
                    );
                }
            }
        }
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn handler(&self, name: &str) -> Option<ToolHandler> {
        self.handlers.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_schema() -> Value {
        json!({ "type": "object", "properties": {} })
    }

    #[test]
    fn paired_tool_is_registered() {
        let module = DomainModule::new("test").tool(
            "ping",
            "Health check",
            empty_schema(),
            |_client, _args| async { Ok(json!("pong")) },
        );
        let mut registry = ToolRegistry::new();
        registry.register(module);
        assert_eq!(registry.len(), 1);
        assert!(registry.handler("ping").is_some());
        assert!(registry.definition("ping").is_some());
    }

    #[test]
    fn definition_without_handler_is_skipped() {
        let module =
            DomainModule::new("test").definition_only("orphan", "No handler", empty_schema());
        let mut registry = ToolRegistry::new();
        registry.register(module);
        assert!(registry.is_empty());
        assert!(registry.handler("orphan").is_none());
    }

    #[test]
    fn definitions_serialize_with_camel_case_schema_key() {
        let def = ToolDefinition {
            name: "list_contacts".to_string(),
            description: "List contacts".to_string(),
            input_schema: empty_schema(),
        };
        let value = serde_json::to_value(&def).unwrap();
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("input_schema").is_none());
    }

    #[test]
    fn standard_catalog_is_fully_paired() {
        let registry = ToolRegistry::standard();
        assert!(registry.len() >= 190);
        for def in registry.definitions() {
            assert!(
                registry.handler(&def.name).is_some(),
                "tool {} advertised without a handler",
                def.name
            );
        }
    }
}
