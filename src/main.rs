use clap::{Parser, ValueEnum};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bexio_mcp::client::BexioClient;
use bexio_mcp::config::Config;
use bexio_mcp::dispatcher::Dispatcher;
use bexio_mcp::registry::ToolRegistry;
use bexio_mcp::transport::{http, stdio};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Line-based JSON-RPC over stdin/stdout, for MCP agent hosts.
    Stdio,
    /// HTTP server with JSON-RPC and direct-call endpoints.
    Http,
}

#[derive(Debug, Parser)]
#[command(name = "bexio-mcp", about = "MCP gateway for the bexio accounting API", version)]
struct Cli {
    /// Transport to run.
    #[arg(long, value_enum, default_value = "stdio")]
    mode: Mode,

    /// Bind address for HTTP mode.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Bind port for HTTP mode.
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for the protocol in stdio mode.
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let client = Arc::new(BexioClient::new(&config.base_url, &config.api_token)?);
    let registry = ToolRegistry::standard();
    let dispatcher = Arc::new(Dispatcher::new(registry, client));

    match cli.mode {
        Mode::Stdio => {
            info!(server = bexio_mcp::SERVER_NAME, "starting in stdio mode");
            stdio::run(dispatcher).await?;
        }
        Mode::Http => {
            info!(
                server = bexio_mcp::SERVER_NAME,
                host = %cli.host,
                port = cli.port,
                "starting in HTTP mode"
            );
            let state = http::AppState {
                dispatcher,
                auth_token: config.http_auth_token,
            };
            http::serve(state, &cli.host, cli.port).await?;
        }
    }
    Ok(())
}
