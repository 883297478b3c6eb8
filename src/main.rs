use analytics::WeeklyRecord;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{Config, LoggingConfig};
use core_types::{parse_team, Role};
use orchestrator::RolePerformanceReport;
use serde_json::Value;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use web_server::AppState;

/// The main entry point for the Gridiron NFL performance service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = configuration::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let _guard = init_tracing(&config.logging)?;

    match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Report(args) => handle_report(args, config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// NFL quarterback, running back and receiver performance metrics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults to `gridiron.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Print one team's performance report to the terminal.
    Report(ReportArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct ReportArgs {
    /// Team abbreviation (e.g., "KC").
    #[arg(long)]
    team: String,

    /// Position group: qb, rb or wr.
    #[arg(long, default_value = "qb")]
    role: Role,

    /// Season to report on. Defaults to the configured or current season.
    #[arg(long)]
    season: Option<u16>,

    /// Treat games after this date (format: YYYY-MM-DD) as not yet played.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = ReportKind::Summary)]
    kind: ReportKind,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportKind {
    /// Most recent game, season and league average.
    Summary,
    /// One row per player per week.
    Weekly,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber: stdout always, plus a daily-rolling file
/// when `logging.directory` is set. `RUST_LOG` wins over `logging.level`.
fn init_tracing(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log level")?;

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "gridiron.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let state = Arc::new(AppState::from_config(&config)?);

    web_server::run_server(addr, state).await
}

async fn handle_report(args: ReportArgs, config: Config) -> anyhow::Result<()> {
    let team = parse_team(&args.team)?;
    let AppState { mut orchestrator } = AppState::from_config(&config)?;
    if let Some(as_of) = args.as_of {
        orchestrator = orchestrator.with_as_of(as_of);
    }

    tracing::info!(team = %team, role = %args.role, "Building report.");

    match args.kind {
        ReportKind::Summary => {
            let report = orchestrator
                .role_performance(&team, args.role, args.season)
                .await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", summary_table(&report)?);
            }
        }
        ReportKind::Weekly => {
            let records = orchestrator
                .weekly_performance(&team, args.role, args.season)
                .await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("{}", weekly_table(&records)?);
            }
        }
    }

    Ok(())
}

// ==============================================================================
// Rendering
// ==============================================================================

fn cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 => format!("{f:.0}"),
            Some(f) => format!("{f:.3}"),
            None => n.to_string(),
        },
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

/// One row per metric, one column per scope.
fn summary_table(report: &RolePerformanceReport) -> anyhow::Result<Table> {
    let game = serde_json::to_value(&report.most_recent_game)?;
    let season = serde_json::to_value(&report.season)?;
    let league = serde_json::to_value(&report.league_average)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Metric", "Most recent game", "Season", "League average"]);

    if let Value::Object(fields) = &season {
        for key in fields.keys().filter(|k| k.as_str() != "games") {
            table.add_row(vec![
                key.clone(),
                cell(game.get(key)),
                cell(season.get(key)),
                cell(league.get(key)),
            ]);
        }
    }
    table.add_row(vec![
        "qualified_players".to_string(),
        "-".to_string(),
        "-".to_string(),
        cell(league.get("qualified_players")),
    ]);
    Ok(table)
}

fn weekly_table(records: &[WeeklyRecord]) -> anyhow::Result<Table> {
    let rows: Vec<Value> = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let Some(Value::Object(first)) = rows.first() else {
        return Ok(table);
    };
    let columns: Vec<String> = first.keys().cloned().collect();
    table.set_header(columns.clone());
    for row in &rows {
        table.add_row(columns.iter().map(|c| cell(row.get(c))).collect::<Vec<_>>());
    }
    Ok(table)
}
