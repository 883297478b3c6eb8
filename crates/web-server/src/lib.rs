use axum::{routing::get, Router};
use chrono::Local;
use configuration::Config;
use core_types::current_season;
use orchestrator::ScopeOrchestrator;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{filter::ParseError, EnvFilter};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub orchestrator: ScopeOrchestrator,
}

impl AppState {
    pub fn new(orchestrator: ScopeOrchestrator) -> Self {
        Self { orchestrator }
    }

    /// Builds the provider the configuration describes and wires it into an orchestrator.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let season = config
            .analysis
            .season
            .unwrap_or_else(|| current_season(Local::now().date_naive()));
        let provider = data_provider::from_config(&config.provider, season)?;
        Ok(Self::new(ScopeOrchestrator::new(
            provider,
            config.analysis.clone(),
        )))
    }
}

/// All application routes, with CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(|| async { "OK" }))
        .route("/general-team-info/:team", get(handlers::general_team_info))
        .route("/qb-weekly-performance/:team", get(handlers::qb_weekly_performance))
        .route("/rb-weekly-performance/:team", get(handlers::rb_weekly_performance))
        .route("/wr-weekly-performance/:team", get(handlers::wr_weekly_performance))
        .route("/qb-performance/:team", get(handlers::qb_performance))
        .route("/rb-performance/:team", get(handlers::rb_performance))
        .route("/wr-performance/:team", get(handlers::wr_performance))
        .route("/epa-per-play/:team", get(handlers::epa_per_play))
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The log filter for the server: `rust_log` (the `RUST_LOG` value) when it
/// parses, otherwise the configured `logging.level`.
pub fn log_filter(rust_log: Option<&str>, level: &str) -> Result<EnvFilter, ParseError> {
    match rust_log.map(EnvFilter::try_new) {
        Some(Ok(filter)) => Ok(filter),
        _ => EnvFilter::try_new(level),
    }
}

/// The main function to configure and run the web server.
pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    // Tracing is initialized by the caller.
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
