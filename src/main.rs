use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use feishu_mcp::feishu::{FeishuClient, FeishuConfig};
use feishu_mcp::server;
use feishu_mcp::tools::ToolRegistry;
use feishu_mcp::tools::bitable::AppendToBitable;

/// Listen port when neither --port nor PORT is given.
const DEFAULT_PORT: u16 = 3002;

#[derive(Parser)]
#[command(
    name = "feishu-mcp",
    version,
    about = "HTTP tool server that appends record batches to a Feishu Bitable"
)]
struct Cli {
    /// Listen port (falls back to the PORT env var, then 3002)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let port = resolve_port(cli.port, std::env::var("PORT").ok());

    // Credentials and table ids are read once here and injected; missing
    // values surface as a remote auth failure on the first invocation.
    let config = FeishuConfig::from_env();
    let client = Arc::new(FeishuClient::new(config));

    let registry = Arc::new(ToolRegistry::new());
    registry
        .register(Arc::new(AppendToBitable::new(client)))
        .await;

    let app = server::build_router(registry);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "feishu tool server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// CLI flag wins, then the PORT env var, then the default.
/// An unparseable env value falls through to the default.
fn resolve_port(flag: Option<u16>, env: Option<String>) -> u16 {
    flag.or_else(|| env.and_then(|v| v.parse().ok()))
        .unwrap_or(DEFAULT_PORT)
}
