use crate::error::OrchestratorError;
use analytics::filter::{filter_by_role, offense_plays, plays_in_games, role_player_ids};
use analytics::{
    aggregate_weekly, resolver, AnalyticsEngine, AnalyticsError, LeagueAverage,
    PerformanceRecord, WeeklyRecord,
};
use chrono::{Local, NaiveDate};
use configuration::AnalysisConfig;
use core_types::{
    current_season, normalize_team, same_team, Game, Play, Role, TeamDescriptor, WeeklyStatRow,
};
use data_provider::{DataProvider, ProviderError};
use serde::Serialize;
use std::sync::Arc;

pub mod error;

/// The three scopes the performance endpoints report side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RolePerformanceReport {
    pub most_recent_game: PerformanceRecord,
    pub season: PerformanceRecord,
    pub league_average: LeagueAverage<PerformanceRecord>,
}

/// Expected points added on a single play, with the offensive formation and
/// both personnel groupings when the provider has them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayEpa {
    pub play_id: u32,
    pub posteam: Option<String>,
    pub defteam: Option<String>,
    pub desc: Option<String>,
    pub epa: f64,
    pub offense_formation: Option<String>,
    pub offense_personnel: Option<String>,
    pub defense_personnel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEpaReport {
    pub game_id: String,
    pub epa_per_play: Vec<PlayEpa>,
}

/// Turns a (team, role, scope) request into provider calls and analytics.
///
/// Every entry point takes an optional season. When it is absent the
/// configured season is used, and failing that the NFL season that contains
/// the `as_of` date.
pub struct ScopeOrchestrator {
    provider: Arc<dyn DataProvider>,
    engine: AnalyticsEngine,
    config: AnalysisConfig,
    as_of: Option<NaiveDate>,
}

impl ScopeOrchestrator {
    pub fn new(provider: Arc<dyn DataProvider>, config: AnalysisConfig) -> Self {
        Self {
            provider,
            engine: AnalyticsEngine::new(),
            config,
            as_of: None,
        }
    }

    /// Pins "today". Games after this date are treated as not yet played.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    fn today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn resolve_season(&self, requested: Option<u16>) -> u16 {
        requested
            .or(self.config.season)
            .unwrap_or_else(|| current_season(self.today()))
    }

    fn min_snaps(&self) -> usize {
        usize::try_from(self.config.min_qualified_snaps).unwrap_or(usize::MAX)
    }

    // --- Data loading ---

    async fn load_schedule(&self, season: u16) -> Result<Arc<Vec<Game>>, OrchestratorError> {
        let games = self.provider.schedules(season).await?;
        non_empty(games, || format!("schedule for season {season}"))
    }

    async fn load_plays(
        &self,
        season: u16,
        include_participation: bool,
    ) -> Result<Arc<Vec<Play>>, OrchestratorError> {
        let plays = self
            .provider
            .play_by_play(season, include_participation)
            .await?;
        non_empty(plays, || format!("play-by-play for season {season}"))
    }

    async fn load_weekly(&self, season: u16) -> Result<Arc<Vec<WeeklyStatRow>>, OrchestratorError> {
        let rows = self.provider.weekly_stats(season).await?;
        non_empty(rows, || format!("weekly stats for season {season}"))
    }

    // --- Scopes ---

    /// Aggregates the team's `role` plays over exactly `game_ids`.
    ///
    /// Both the single-game and the season scope reduce to this, so a one-game
    /// season and the most recent game produce the same record.
    pub async fn performance_for_games(
        &self,
        team: &str,
        role: Role,
        season: Option<u16>,
        game_ids: &[String],
    ) -> Result<PerformanceRecord, OrchestratorError> {
        let plays = self.load_plays(self.resolve_season(season), false).await?;
        self.aggregate_games(&plays, team, role, game_ids)
    }

    /// The role's aggregate over the team's most recent played game.
    pub async fn game_performance(
        &self,
        team: &str,
        role: Role,
        season: Option<u16>,
    ) -> Result<PerformanceRecord, OrchestratorError> {
        let season = self.resolve_season(season);
        let (games, plays) =
            tokio::try_join!(self.load_schedule(season), self.load_plays(season, false))?;
        let game_id = resolver::most_recent_game(team, &games, self.today())?;
        self.aggregate_games(&plays, team, role, &[game_id])
    }

    /// The role's aggregate over every game the team has played this season.
    pub async fn season_performance(
        &self,
        team: &str,
        role: Role,
        season: Option<u16>,
    ) -> Result<PerformanceRecord, OrchestratorError> {
        let season = self.resolve_season(season);
        let (games, plays) =
            tokio::try_join!(self.load_schedule(season), self.load_plays(season, false))?;
        let game_ids = resolver::season_games(team, &games, self.today())?;
        self.aggregate_games(&plays, team, role, &game_ids)
    }

    pub async fn league_average_performance(
        &self,
        role: Role,
        season: Option<u16>,
    ) -> Result<LeagueAverage<PerformanceRecord>, OrchestratorError> {
        let season = self.resolve_season(season);
        let plays = self.load_plays(season, false).await?;
        self.league_average(role, &plays, season)
    }

    /// Most recent game, season and league average in one pass over the data.
    pub async fn role_performance(
        &self,
        team: &str,
        role: Role,
        season: Option<u16>,
    ) -> Result<RolePerformanceReport, OrchestratorError> {
        let season = self.resolve_season(season);
        let (games, plays) =
            tokio::try_join!(self.load_schedule(season), self.load_plays(season, false))?;

        let today = self.today();
        let season_ids = resolver::season_games(team, &games, today)?;
        let latest = resolver::most_recent_game(team, &games, today)?;

        let report = RolePerformanceReport {
            most_recent_game: self.aggregate_games(&plays, team, role, &[latest])?,
            season: self.aggregate_games(&plays, team, role, &season_ids)?,
            league_average: self.league_average(role, &plays, season)?,
        };
        tracing::info!(
            team = %normalize_team(team),
            role = %role,
            season,
            games = season_ids.len(),
            "Computed role performance."
        );
        Ok(report)
    }

    /// Per-week box scores of every player the team used in `role` this season.
    pub async fn weekly_performance(
        &self,
        team: &str,
        role: Role,
        season: Option<u16>,
    ) -> Result<Vec<WeeklyRecord>, OrchestratorError> {
        let season = self.resolve_season(season);
        let (games, plays, rows) = tokio::try_join!(
            self.load_schedule(season),
            self.load_plays(season, false),
            self.load_weekly(season)
        )?;

        let game_ids = resolver::season_games(team, &games, self.today())?;
        let season_plays = plays_in_games(&plays, &game_ids);
        let role_plays = filter_by_role(season_plays, team, role);
        let player_ids = role_player_ids(&role_plays, role);

        let records = aggregate_weekly(role, &rows, &player_ids);
        if records.is_empty() {
            return Err(OrchestratorError::NotFound(format!(
                "No weekly {role} stats for team {} in season {season}",
                normalize_team(team)
            )));
        }
        Ok(records)
    }

    /// Descriptors of the franchise with this abbreviation.
    pub async fn team_info(&self, team: &str) -> Result<Vec<TeamDescriptor>, OrchestratorError> {
        let teams = non_empty(self.provider.team_descriptors().await?, || {
            "team descriptors".to_string()
        })?;
        let matching: Vec<TeamDescriptor> = teams
            .iter()
            .filter(|t| same_team(&t.team_abbr, team))
            .cloned()
            .collect();
        if matching.is_empty() {
            return Err(OrchestratorError::NotFound(format!(
                "Unknown team {}",
                normalize_team(team)
            )));
        }
        Ok(matching)
    }

    /// EPA of every play in the team's most recent game, both sides of the ball.
    pub async fn game_epa(
        &self,
        team: &str,
        season: Option<u16>,
    ) -> Result<GameEpaReport, OrchestratorError> {
        let season = self.resolve_season(season);
        let (games, plays) =
            tokio::try_join!(self.load_schedule(season), self.load_plays(season, true))?;
        let game_id = resolver::most_recent_game(team, &games, self.today())?;

        let game_plays: Vec<&Play> = plays.iter().filter(|p| p.game_id == game_id).collect();
        if game_plays.is_empty() {
            return Err(OrchestratorError::NotFound(format!(
                "No plays found for game {game_id}"
            )));
        }

        let epa_per_play = game_plays
            .into_iter()
            .filter_map(|p| {
                let participation = p.participation.as_ref();
                Some(PlayEpa {
                    play_id: p.play_id,
                    posteam: p.posteam.clone(),
                    defteam: p.defteam.clone(),
                    desc: p.desc.clone(),
                    epa: p.epa?,
                    offense_formation: participation.and_then(|row| row.offense_formation.clone()),
                    offense_personnel: participation.and_then(|row| row.offense_personnel.clone()),
                    defense_personnel: participation.and_then(|row| row.defense_personnel.clone()),
                })
            })
            .collect();

        Ok(GameEpaReport {
            game_id,
            epa_per_play,
        })
    }

    fn league_average(
        &self,
        role: Role,
        plays: &[Play],
        season: u16,
    ) -> Result<LeagueAverage<PerformanceRecord>, OrchestratorError> {
        let min_snaps = self.min_snaps();
        self.engine
            .league_average(role, plays, min_snaps)
            .map_err(|err| match err {
                AnalyticsError::NotEnoughData(_) => OrchestratorError::NotFound(format!(
                    "No {role} league average for season {season} yet: no player has more \
                     than {min_snaps} plays"
                )),
                other => other.into(),
            })
    }

    fn aggregate_games(
        &self,
        plays: &[Play],
        team: &str,
        role: Role,
        game_ids: &[String],
    ) -> Result<PerformanceRecord, OrchestratorError> {
        let team_plays = offense_plays(plays_in_games(plays, game_ids), team);
        let role_plays = filter_by_role(team_plays.iter().copied(), team, role);
        if role_plays.is_empty() {
            return Err(OrchestratorError::NotFound(format!(
                "No {role} plays for team {} in {} game(s)",
                normalize_team(team),
                game_ids.len()
            )));
        }
        Ok(self.engine.aggregate(role, &role_plays, &team_plays))
    }
}

fn non_empty<T>(
    data: Arc<Vec<T>>,
    what: impl FnOnce() -> String,
) -> Result<Arc<Vec<T>>, OrchestratorError> {
    if data.is_empty() {
        let what = what();
        tracing::warn!(dataset = %what, "Provider returned no rows.");
        return Err(ProviderError::EmptyDataset(what).into());
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Participant, Participation, PlayType};
    use data_provider::StaticProvider;

    const SEASON: u16 = 2024;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn game(id: &str, home: &str, away: &str, gameday: NaiveDate) -> Game {
        Game {
            game_id: id.to_string(),
            season: SEASON,
            week: 1,
            home_team: home.to_string(),
            away_team: away.to_string(),
            gameday,
        }
    }

    fn pass(game_id: &str, team: &str, passer: &str, yards: f64, epa: Option<f64>) -> Play {
        Play {
            game_id: game_id.to_string(),
            posteam: Some(team.to_string()),
            defteam: Some("OPP".to_string()),
            play_type: PlayType::Pass,
            qb_dropback: true,
            pass_attempt: true,
            complete_pass: yards > 0.0,
            passing_yards: yards,
            epa,
            passer: Some(Participant::new(passer, Some(passer))),
            ..Default::default()
        }
    }

    fn fixture() -> StaticProvider {
        let games = vec![
            game("2024_01_BAL_KC", "KC", "BAL", date(9, 5)),
            game("2024_02_KC_CIN", "CIN", "KC", date(9, 15)),
            game("2024_03_ATL_KC", "KC", "ATL", date(12, 1)),
        ];
        let mut plays = Vec::new();
        plays.extend((0..20).map(|_| pass("2024_01_BAL_KC", "KC", "mahomes", 10.0, Some(0.5))));
        plays.extend((0..12).map(|_| pass("2024_02_KC_CIN", "KC", "mahomes", 5.0, None)));
        plays.extend((0..40).map(|_| pass("2024_01_BAL_KC", "BAL", "jackson", 8.0, Some(0.2))));
        plays.push(Play {
            play_id: 77,
            desc: Some("kneel".to_string()),
            participation: Some(Participation {
                offense_formation: Some("SHOTGUN".to_string()),
                offense_personnel: Some("1 RB, 1 TE, 3 WR".to_string()),
                ..Default::default()
            }),
            ..pass("2024_02_KC_CIN", "CIN", "burrow", 0.0, Some(-0.1))
        });

        let weekly = vec![WeeklyStatRow {
            player_id: "mahomes".to_string(),
            player_name: "P.Mahomes".to_string(),
            season: SEASON,
            week: 1,
            attempts: 20.0,
            passing_yards: 200.0,
            ..Default::default()
        }];

        StaticProvider::new()
            .with_games(games)
            .with_plays(SEASON, plays)
            .with_weekly(SEASON, weekly)
    }

    fn orchestrator(provider: StaticProvider, as_of: NaiveDate) -> ScopeOrchestrator {
        ScopeOrchestrator::new(Arc::new(provider), AnalysisConfig::default()).with_as_of(as_of)
    }

    #[tokio::test]
    async fn test_game_scope_equals_single_game_primitive() {
        let orch = orchestrator(fixture(), date(10, 1));
        let game = orch.game_performance("KC", Role::Qb, Some(SEASON)).await.unwrap();
        let direct = orch
            .performance_for_games("KC", Role::Qb, Some(SEASON), &["2024_02_KC_CIN".to_string()])
            .await
            .unwrap();
        assert_eq!(game, direct);
        assert_eq!(game.games(), ["2024_02_KC_CIN".to_string()]);
    }

    #[tokio::test]
    async fn test_season_scope_covers_only_played_games() {
        let orch = orchestrator(fixture(), date(10, 1));
        let PerformanceRecord::Qb(season) = orch
            .season_performance("kc", Role::Qb, Some(SEASON))
            .await
            .unwrap()
        else {
            panic!("expected a quarterback record");
        };
        assert_eq!(season.games.len(), 2);
        assert_eq!(season.attempts, 32.0);
        assert_eq!(season.epa_per_play, Some(0.5));
    }

    #[tokio::test]
    async fn test_no_past_games_is_not_found() {
        let orch = orchestrator(fixture(), date(8, 1));
        let err = orch.game_performance("KC", Role::Qb, Some(SEASON)).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_upstream_is_an_upstream_error() {
        let orch = orchestrator(StaticProvider::new(), date(10, 1));
        let err = orch.season_performance("KC", Role::Qb, Some(SEASON)).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Upstream(ProviderError::EmptyDataset(_))
        ));
    }

    #[tokio::test]
    async fn test_role_without_plays_is_not_found() {
        let orch = orchestrator(fixture(), date(10, 1));
        let err = orch.game_performance("KC", Role::Rb, Some(SEASON)).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_role_performance_combines_scopes() {
        let orch = orchestrator(fixture(), date(10, 1));
        let report = orch.role_performance("KC", Role::Qb, Some(SEASON)).await.unwrap();
        assert_eq!(report.most_recent_game.games().len(), 1);
        assert_eq!(report.season.games().len(), 2);
        // Only jackson (40) and mahomes (32) clear the 30-snap bar.
        assert_eq!(report.league_average.qualified_players, 2);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["league_average"]["attempts"].is_number());
    }

    #[tokio::test]
    async fn test_weekly_performance_uses_team_players() {
        let orch = orchestrator(fixture(), date(10, 1));
        let records = orch.weekly_performance("KC", Role::Qb, Some(SEASON)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player_id(), "mahomes");

        let err = orch.weekly_performance("BAL", Role::Qb, Some(SEASON)).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_game_epa_skips_null_epa() {
        let orch = orchestrator(fixture(), date(10, 1));
        let report = orch.game_epa("KC", Some(SEASON)).await.unwrap();
        assert_eq!(report.game_id, "2024_02_KC_CIN");
        // The twelve KC passes have no EPA; only the kneel remains.
        assert_eq!(report.epa_per_play.len(), 1);
        assert_eq!(report.epa_per_play[0].play_id, 77);
        assert_eq!(report.epa_per_play[0].offense_formation.as_deref(), Some("SHOTGUN"));
        assert_eq!(report.epa_per_play[0].defense_personnel, None);
    }

    #[tokio::test]
    async fn test_thin_league_is_not_found_with_team_facing_message() {
        let carry = Play {
            game_id: "2024_01_BAL_KC".to_string(),
            posteam: Some("KC".to_string()),
            defteam: Some("BAL".to_string()),
            play_type: PlayType::Run,
            rushing_yards: 4.0,
            rusher: Some(Participant::new("pacheco", Some("I.Pacheco"))),
            ..Default::default()
        };
        let games = vec![game("2024_01_BAL_KC", "KC", "BAL", date(9, 5))];
        let provider = StaticProvider::new()
            .with_games(games)
            .with_plays(SEASON, vec![carry; 5]);
        let orch = orchestrator(provider, date(9, 10));

        let err = orch.role_performance("KC", Role::Rb, Some(SEASON)).await.unwrap_err();
        let OrchestratorError::NotFound(message) = err else {
            panic!("expected not found, got {err:?}");
        };
        assert_eq!(
            message,
            "No RB league average for season 2024 yet: no player has more than 30 plays"
        );
    }

    #[tokio::test]
    async fn test_team_info() {
        let teams = vec![TeamDescriptor {
            team_abbr: "KC".to_string(),
            team_name: "Kansas City Chiefs".to_string(),
            team_id: None,
            team_nick: Some("Chiefs".to_string()),
            team_conf: Some("AFC".to_string()),
            team_division: Some("AFC West".to_string()),
            team_color: None,
            team_color2: None,
            team_logo_espn: None,
            team_wordmark: None,
        }];
        let orch = orchestrator(StaticProvider::new().with_teams(teams), date(10, 1));
        assert_eq!(orch.team_info("kc").await.unwrap().len(), 1);
        assert!(matches!(
            orch.team_info("BUF").await.unwrap_err(),
            OrchestratorError::NotFound(_)
        ));
    }

    #[test]
    fn test_resolve_season_precedence() {
        let orch = orchestrator(StaticProvider::new(), date(10, 1));
        assert_eq!(orch.resolve_season(Some(2021)), 2021);
        assert_eq!(orch.resolve_season(None), 2024);

        let pinned = ScopeOrchestrator::new(
            Arc::new(StaticProvider::new()),
            AnalysisConfig {
                season: Some(2022),
                ..Default::default()
            },
        );
        assert_eq!(pinned.resolve_season(None), 2022);
    }
}
