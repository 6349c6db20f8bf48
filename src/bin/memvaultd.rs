//! MemVault daemon - HTTP service exposing memory store/recall endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use memvault::config::Config;
use memvault::embedding::TogetherEmbeddings;
use memvault::index::PineconeIndex;
use memvault::server::{build_router, AppState};
use memvault::service::MemoryService;
use tracing::info;

#[derive(Parser)]
#[command(name = "memvaultd", about = "MemVault semantic memory service")]
struct Args {
    /// Bind address
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port
    #[arg(long, short, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Pick up a local .env if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = Config::from_env()?;
    info!(
        "Using Pinecone index '{}' at {}",
        config.pinecone.index, config.pinecone.host
    );

    // Build clients once; handlers share them through AppState
    let embeddings = TogetherEmbeddings::new(config.embedding)?;
    let index = PineconeIndex::new(config.pinecone)?;
    let service = MemoryService::new(Arc::new(embeddings), Arc::new(index));

    let app = build_router(AppState {
        service: Arc::new(service),
    });

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Memory service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
