use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// The placeholder substituted with the season year in provider URL templates.
pub const SEASON_PLACEHOLDER: &str = "{season}";

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

/// Where the HTTP server binds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where season datasets are fetched from and how long they are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// The full schedule file (all seasons, filtered after download).
    pub schedules_url: String,
    /// Play-by-play file for one season; must contain `{season}`.
    pub play_by_play_url: String,
    /// Formation/personnel file for one season; must contain `{season}`.
    pub participation_url: String,
    /// Weekly player box scores for one season; must contain `{season}`.
    pub weekly_stats_url: String,
    pub teams_url: String,
    pub timeout_secs: u64,
    /// Lifetime of cached current-season datasets. Past seasons never expire.
    pub cache_ttl_secs: u64,
    /// Serve from local CSV files in this directory instead of downloading.
    pub data_dir: Option<PathBuf>,
}

/// Parameters for the metric aggregation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pin every request to this season. Defaults to the current NFL season.
    pub season: Option<u16>,
    /// A player needs strictly more snaps than this to enter the league average.
    pub min_qualified_snaps: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Write a daily-rolling log file here in addition to stdout.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        const RELEASES: &str = "https://github.com/nflverse/nflverse-data/releases/download";
        Self {
            schedules_url: "https://raw.githubusercontent.com/nflverse/nfldata/master/data/games.csv"
                .to_string(),
            play_by_play_url: format!("{RELEASES}/pbp/play_by_play_{SEASON_PLACEHOLDER}.csv"),
            participation_url: format!(
                "{RELEASES}/pbp_participation/pbp_participation_{SEASON_PLACEHOLDER}.csv"
            ),
            weekly_stats_url: format!(
                "{RELEASES}/player_stats/player_stats_{SEASON_PLACEHOLDER}.csv"
            ),
            teams_url: "https://github.com/nflverse/nflverse-pbp/raw/master/teams_colors_logos.csv"
                .to_string(),
            timeout_secs: 30,
            cache_ttl_secs: 300,
            data_dir: None,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            season: None,
            min_qualified_snaps: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Rejects settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider.timeout_secs must be non-zero".to_string(),
            ));
        }
        for (key, template) in [
            ("provider.play_by_play_url", &self.provider.play_by_play_url),
            ("provider.participation_url", &self.provider.participation_url),
            ("provider.weekly_stats_url", &self.provider.weekly_stats_url),
        ] {
            if !template.contains(SEASON_PLACEHOLDER) {
                return Err(ConfigError::ValidationError(format!(
                    "{key} must contain the {SEASON_PLACEHOLDER} placeholder"
                )));
            }
        }
        Ok(())
    }
}
