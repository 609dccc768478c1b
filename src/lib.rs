//! MCP gateway for the bexio accounting API.
//!
//! Exposes a couple hundred bexio operations (contacts, invoices, quotes,
//! orders, projects, time tracking, payroll, banking, accounting, reference
//! data) as individually named, schema-validated tools. Agents connect over
//! line-based JSON-RPC on stdio; remote callers use the HTTP surface, which
//! serves the same JSON-RPC protocol plus direct-call endpoints.
//!
//! The crate is a dispatch-and-protocol layer. bexio itself is an opaque
//! collaborator behind [`client::BexioClient`]; no business rules are
//! reimplemented here.

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod probe;
pub mod registry;
pub mod response;
pub mod tools;
pub mod transport;
pub mod validate;

/// Server name advertised during the MCP handshake.
pub const SERVER_NAME: &str = "bexio-mcp";

/// Crate version, advertised during the MCP handshake.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
