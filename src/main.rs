use anyhow::{Context, Result};
use clap::Parser;
use livemind::{create_router, AppState, Config, MemoryStore};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "livemind", about = "Live session persistence service")]
struct Args {
    /// Config file (without extension)
    #[arg(long, default_value = "config/livemind")]
    config: String,

    /// Override the HTTP port from the config file
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    let port = args.port.unwrap_or(cfg.service.http.port);

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!(
        "Audio: {} Hz in / {} Hz out, {}-sample blocks",
        cfg.audio.input_sample_rate, cfg.audio.output_sample_rate, cfg.audio.block_size
    );
    info!("Live relay: {}", cfg.transport.url);

    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store);
    let router = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
