//! Protocol transports: line-based stdio and axum HTTP.

pub mod http;
pub mod rpc;
pub mod stdio;
