//! Equity Analyzer HTTP server
//!
//! Run with: cargo run --bin equity-api -- --port 8000

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use equity_analyzer::api::{ApiState, build_router};
use equity_analyzer::load_config;

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload workbooks, get ranked equities back")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: std::net::IpAddr,

    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// TOML file overriding the built-in configurations and pipeline settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let config = load_config(args.config.as_deref())?;
    log::info!(
        "Expecting uploads: {}",
        config.required_files().join(", ")
    );

    let app = build_router(ApiState { config });

    let addr = SocketAddr::new(args.host, args.port);
    log::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
