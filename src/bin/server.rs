//! Chat server binary
//!
//! Run with: cargo run --bin docchat-server

use docchat_rag::{config::AppConfig, server::ChatServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docchat_rag=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    tracing::info!("configuration loaded");
    tracing::info!("  - embedding model: {}", config.embeddings.model);
    tracing::info!("  - chat model: {}", config.llm.chat_model);
    tracing::info!("  - index: {}", config.index.index_name);
    tracing::info!("  - chunk size: {}", config.chunking.chunk_size);

    let ingest_on_startup = config.ingestion.ingest_on_startup;
    let source_path = config.ingestion.source_path.clone();

    let server = ChatServer::new(config)?;

    if ingest_on_startup {
        // Provisioning or ingestion failure at startup is surfaced, not
        // retried in a loop.
        let report = server.state().pipeline().ingest(&source_path).await?;
        tracing::info!(
            entries_written = report.entries_written,
            "startup ingestion complete"
        );
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/chat    - Ask questions (streamed answer + sources)");
    println!("  POST /api/ingest  - Ingest the source document");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
