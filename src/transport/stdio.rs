//! Line-based stdio transport.
//!
//! One JSON-RPC message per line on stdin, one response per line on stdout.
//! Requests run concurrently in spawned tasks; a single writer task serializes
//! output so concurrent responses never interleave. All diagnostics go to
//! stderr, keeping stdout protocol-only. EOF on stdin ends the session.

use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::rpc::{self, JsonRpcRequest, JsonRpcResponse, ToolCallStyle};
use crate::dispatcher::Dispatcher;
use crate::error::{McpError, McpResult};

/// Runs the stdio session until EOF.
pub async fn run(dispatcher: Arc<Dispatcher>) -> McpResult<()> {
    info!("stdio transport ready");

    let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(64);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(response) = rx.recv().await {
            match serde_json::to_string(&response) {
                Ok(line) => {
                    if stdout.write_all(line.as_bytes()).await.is_err()
                        || stdout.write_all(b"\n").await.is_err()
                        || stdout.flush().await.is_err()
                    {
                        error!("stdout closed; stopping writer");
                        break;
                    }
                }
                Err(e) => error!(error = %e, "failed to serialize response"),
            }
        }
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| McpError::internal(format!("stdin read failed: {e}")))?
    {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "unparseable request line");
                let _ = tx
                    .send(JsonRpcResponse::failure(
                        Value::Null,
                        rpc::PARSE_ERROR,
                        format!("Parse error: {e}"),
                    ))
                    .await;
                continue;
            }
        };

        let dispatcher = Arc::clone(&dispatcher);
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) =
                rpc::handle_request(&dispatcher, request, ToolCallStyle::Envelope).await
            {
                let _ = tx.send(response).await;
            }
        });
    }

    info!("stdin closed; shutting down");
    drop(tx);
    let _ = writer.await;
    Ok(())
}
