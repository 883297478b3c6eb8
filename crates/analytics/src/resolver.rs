//! Works out which of a team's scheduled games have already been played.
//!
//! A game "counts" once its date is on or before the `as_of` date. Games on the
//! same day are ordered by `game_id`, so the most recent game of a same-day
//! pair is the one with the greater identifier.

use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{normalize_team, Game};

/// All scheduled games the team takes part in, home or away.
pub fn team_games<'a>(team: &str, games: &'a [Game]) -> Result<Vec<&'a Game>, AnalyticsError> {
    let team_games: Vec<&Game> = games.iter().filter(|g| g.involves(team)).collect();
    if team_games.is_empty() {
        return Err(AnalyticsError::NoGamesForTeam(normalize_team(team)));
    }
    Ok(team_games)
}

/// The team's games played on or before `as_of`, oldest first.
pub fn past_games<'a>(
    team: &str,
    games: &'a [Game],
    as_of: NaiveDate,
) -> Result<Vec<&'a Game>, AnalyticsError> {
    let mut past: Vec<&Game> = team_games(team, games)?
        .into_iter()
        .filter(|g| g.gameday <= as_of)
        .collect();

    if past.is_empty() {
        return Err(AnalyticsError::NoPastGames {
            team: normalize_team(team),
            as_of,
        });
    }

    past.sort_by(|a, b| (a.gameday, &a.game_id).cmp(&(b.gameday, &b.game_id)));
    Ok(past)
}

/// Identifiers of the team's played games, oldest first.
pub fn season_games(
    team: &str,
    games: &[Game],
    as_of: NaiveDate,
) -> Result<Vec<String>, AnalyticsError> {
    Ok(past_games(team, games, as_of)?
        .into_iter()
        .map(|g| g.game_id.clone())
        .collect())
}

/// Identifier of the team's latest played game.
pub fn most_recent_game(
    team: &str,
    games: &[Game],
    as_of: NaiveDate,
) -> Result<String, AnalyticsError> {
    let past = past_games(team, games, as_of)?;
    let latest = past.last().ok_or_else(|| AnalyticsError::NoPastGames {
        team: normalize_team(team),
        as_of,
    })?;
    tracing::debug!(team, game_id = %latest.game_id, "Resolved most recent game.");
    Ok(latest.game_id.clone())
}
