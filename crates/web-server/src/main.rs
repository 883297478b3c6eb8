use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use web_server::AppState;

// Entry point for `cargo run -p web-server`: serve with the default config
// file and environment overrides, logging to stdout only.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = configuration::load_config(None)?;

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = web_server::log_filter(rust_log.as_deref(), &config.logging.level)?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = Arc::new(AppState::from_config(&config)?);
    web_server::run_server(addr, state).await
}
