use crate::error::ProviderError;
use crate::rows;
use crate::DataProvider;
use async_trait::async_trait;
use core_types::{Game, Play, TeamDescriptor, WeeklyStatRow};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// A `DataProvider` serving datasets that are already in memory.
///
/// Used for offline runs against local copies of the nflverse files and as the
/// fixture provider in tests. Seasons that were never loaded come back empty.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    games: Vec<Game>,
    plays: HashMap<u16, Arc<Vec<Play>>>,
    weekly: HashMap<u16, Arc<Vec<WeeklyStatRow>>>,
    teams: Arc<Vec<TeamDescriptor>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_games(mut self, games: Vec<Game>) -> Self {
        self.games.extend(games);
        self
    }

    pub fn with_plays(mut self, season: u16, plays: Vec<Play>) -> Self {
        self.plays.insert(season, Arc::new(plays));
        self
    }

    pub fn with_weekly(mut self, season: u16, rows: Vec<WeeklyStatRow>) -> Self {
        self.weekly.insert(season, Arc::new(rows));
        self
    }

    pub fn with_teams(mut self, teams: Vec<TeamDescriptor>) -> Self {
        self.teams = Arc::new(teams);
        self
    }

    /// Loads one season from a directory holding the nflverse file names:
    /// `games.csv`, `play_by_play_{season}.csv`, `player_stats_{season}.csv`,
    /// and optionally `pbp_participation_{season}.csv` and `teams_colors_logos.csv`.
    pub fn load_dir(dir: &Path, season: u16) -> Result<Self, ProviderError> {
        tracing::info!(dir = %dir.display(), season, "Loading local datasets.");

        let games = rows::parse_games(open(&dir.join("games.csv"))?, Some(season))?;
        let mut plays = rows::parse_plays(open(&dir.join(format!("play_by_play_{season}.csv")))?)?;
        let weekly = rows::parse_weekly(open(&dir.join(format!("player_stats_{season}.csv")))?)?;

        let participation_path = dir.join(format!("pbp_participation_{season}.csv"));
        if participation_path.exists() {
            let participation = rows::parse_participation(open(&participation_path)?)?;
            rows::attach_participation(&mut plays, participation);
        }

        let teams_path = dir.join("teams_colors_logos.csv");
        let teams = if teams_path.exists() {
            rows::parse_teams(open(&teams_path)?)?
        } else {
            Vec::new()
        };

        Ok(Self::new()
            .with_games(games)
            .with_plays(season, plays)
            .with_weekly(season, weekly)
            .with_teams(teams))
    }
}

fn open(path: &Path) -> Result<BufReader<File>, ProviderError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ProviderError::Io {
            path: path.display().to_string(),
            source,
        })
}

#[async_trait]
impl DataProvider for StaticProvider {
    async fn schedules(&self, season: u16) -> Result<Arc<Vec<Game>>, ProviderError> {
        let games = self.games.iter().filter(|g| g.season == season).cloned().collect();
        Ok(Arc::new(games))
    }

    /// Participation is returned whenever it was loaded; the flag only matters
    /// to providers that have to fetch it separately.
    async fn play_by_play(
        &self,
        season: u16,
        _include_participation: bool,
    ) -> Result<Arc<Vec<Play>>, ProviderError> {
        Ok(self.plays.get(&season).cloned().unwrap_or_default())
    }

    async fn weekly_stats(&self, season: u16) -> Result<Arc<Vec<WeeklyStatRow>>, ProviderError> {
        Ok(self.weekly.get(&season).cloned().unwrap_or_default())
    }

    async fn team_descriptors(&self) -> Result<Arc<Vec<TeamDescriptor>>, ProviderError> {
        Ok(self.teams.clone())
    }
}
