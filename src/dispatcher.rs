//! Tool dispatch: lookup, validation, invocation, classification.

use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use crate::client::BexioClient;
use crate::error::{McpError, McpResult};
use crate::registry::ToolRegistry;
use crate::response::{error_envelope, success_envelope, ToolEnvelope};
use crate::validate::validate_args;

/// Shared dispatch state handed to both transports.
pub struct Dispatcher {
    registry: ToolRegistry,
    client: Arc<BexioClient>,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, client: Arc<BexioClient>) -> Self {
        Self { registry, client }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Runs one tool call end to end.
    ///
    /// Never escapes with anything but a classified error: unknown tools are
    /// NOT_FOUND, schema violations VALIDATION_ERROR, and a panicking
    /// handler is caught and reported as INTERNAL_ERROR.
    pub async fn dispatch(&self, name: &str, args: Value) -> McpResult<Value> {
        debug!(tool = name, "dispatching tool call");

        let definition = self
            .registry
            .definition(name)
            .ok_or_else(|| McpError::not_found("Tool", name))?;
        let handler = self
            .registry
            .handler(name)
            .ok_or_else(|| McpError::not_found("Tool", name))?;

        let args = validate_args(&definition.input_schema, args)?;

        let future = handler(Arc::clone(&self.client), args);
        match std::panic::AssertUnwindSafe(future).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "handler panicked".to_string());
                error!(tool = name, panic = %detail, "tool handler panicked");
                Err(McpError::internal(format!("tool {name} failed: {detail}")))
            }
        }
    }

    /// Like [`dispatch`](Self::dispatch) but wrapped into the MCP content
    /// envelope, turning errors into `isError` payloads.
    pub async fn dispatch_envelope(&self, name: &str, args: Value) -> ToolEnvelope {
        match self.dispatch(name, args).await {
            Ok(payload) => success_envelope(name, &payload),
            Err(err) => error_envelope(&err),
        }
    }
}
