use crate::error::ProviderError;
use chrono::NaiveDate;
use core_types::{Game, Participant, Participation, Play, PlayType, TeamDescriptor, WeeklyStatRow};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

// The nflverse files are wide CSVs. Only the columns listed here are read; serde
// ignores every other header. Missing cells come through as "" or "NA".

/// Raw row of the schedule file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGame {
    #[serde(deserialize_with = "na::text")]
    game_id: Option<String>,
    #[serde(deserialize_with = "na::number")]
    season: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    week: Option<f64>,
    #[serde(deserialize_with = "na::text")]
    gameday: Option<String>,
    #[serde(deserialize_with = "na::text")]
    home_team: Option<String>,
    #[serde(deserialize_with = "na::text")]
    away_team: Option<String>,
}

/// Raw row of a play-by-play file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPlay {
    #[serde(deserialize_with = "na::number")]
    play_id: Option<f64>,
    #[serde(deserialize_with = "na::text")]
    game_id: Option<String>,
    #[serde(deserialize_with = "na::number")]
    week: Option<f64>,
    #[serde(deserialize_with = "na::text")]
    posteam: Option<String>,
    #[serde(deserialize_with = "na::text")]
    defteam: Option<String>,
    #[serde(deserialize_with = "na::text")]
    play_type: Option<String>,
    #[serde(deserialize_with = "na::number")]
    qb_dropback: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    epa: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    cpoe: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    complete_pass: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    pass_attempt: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    pass_touchdown: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    rush_touchdown: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    interception: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    sack: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    first_down: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    fumble_lost: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    yards_gained: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    passing_yards: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    rushing_yards: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    receiving_yards: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    air_yards: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    yards_after_catch: Option<f64>,
    #[serde(deserialize_with = "na::text")]
    passer_player_id: Option<String>,
    #[serde(deserialize_with = "na::text")]
    passer_player_name: Option<String>,
    #[serde(deserialize_with = "na::text")]
    rusher_player_id: Option<String>,
    #[serde(deserialize_with = "na::text")]
    rusher_player_name: Option<String>,
    #[serde(deserialize_with = "na::text")]
    receiver_player_id: Option<String>,
    #[serde(deserialize_with = "na::text")]
    receiver_player_name: Option<String>,
    #[serde(deserialize_with = "na::text")]
    desc: Option<String>,
}

/// Raw row of a participation file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawParticipation {
    #[serde(alias = "game_id", deserialize_with = "na::text")]
    nflverse_game_id: Option<String>,
    #[serde(deserialize_with = "na::number")]
    play_id: Option<f64>,
    #[serde(deserialize_with = "na::text")]
    offense_formation: Option<String>,
    #[serde(deserialize_with = "na::text")]
    offense_personnel: Option<String>,
    #[serde(deserialize_with = "na::text")]
    defense_personnel: Option<String>,
    #[serde(deserialize_with = "na::number")]
    defenders_in_box: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    number_of_pass_rushers: Option<f64>,
}

/// Raw row of a weekly player stats file.
///
/// Aliases cover the column renames between nflverse stats releases.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawWeekly {
    #[serde(deserialize_with = "na::text")]
    player_id: Option<String>,
    #[serde(deserialize_with = "na::text")]
    player_name: Option<String>,
    #[serde(deserialize_with = "na::text")]
    player_display_name: Option<String>,
    #[serde(deserialize_with = "na::text")]
    position: Option<String>,
    #[serde(alias = "team", deserialize_with = "na::text")]
    recent_team: Option<String>,
    #[serde(deserialize_with = "na::number")]
    season: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    week: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    completions: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    attempts: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    passing_yards: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    passing_tds: Option<f64>,
    #[serde(alias = "passing_interceptions", deserialize_with = "na::number")]
    interceptions: Option<f64>,
    #[serde(alias = "sacks_suffered", deserialize_with = "na::number")]
    sacks: Option<f64>,
    #[serde(alias = "sack_yards_lost", deserialize_with = "na::number")]
    sack_yards: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    passing_epa: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    dakota: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    carries: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    rushing_yards: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    rushing_tds: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    rushing_fumbles: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    rushing_first_downs: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    rushing_epa: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    receptions: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    targets: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    receiving_yards: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    receiving_tds: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    receiving_air_yards: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    receiving_yards_after_catch: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    receiving_first_downs: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    receiving_epa: Option<f64>,
    #[serde(deserialize_with = "na::number")]
    target_share: Option<f64>,
}

/// Raw row of the team descriptor file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTeam {
    #[serde(deserialize_with = "na::text")]
    team_abbr: Option<String>,
    #[serde(deserialize_with = "na::text")]
    team_name: Option<String>,
    #[serde(deserialize_with = "na::text")]
    team_id: Option<String>,
    #[serde(deserialize_with = "na::text")]
    team_nick: Option<String>,
    #[serde(deserialize_with = "na::text")]
    team_conf: Option<String>,
    #[serde(deserialize_with = "na::text")]
    team_division: Option<String>,
    #[serde(deserialize_with = "na::text")]
    team_color: Option<String>,
    #[serde(deserialize_with = "na::text")]
    team_color2: Option<String>,
    #[serde(deserialize_with = "na::text")]
    team_logo_espn: Option<String>,
    #[serde(deserialize_with = "na::text")]
    team_wordmark: Option<String>,
}

/// Deserializers that turn empty and `NA` cells into `None`.
mod na {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "NA"))
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match text(deserializer)? {
            Some(s) => {
                let value = s.parse::<f64>().map_err(D::Error::custom)?;
                Ok(Some(value).filter(|v| v.is_finite()))
            }
            None => Ok(None),
        }
    }
}

// --- Conversions into core types ---

fn flag(value: Option<f64>) -> bool {
    value.is_some_and(|v| v != 0.0)
}

fn amount(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

fn small_int<T: TryFrom<i64>>(value: Option<f64>, column: &str) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("missing {column}"))?;
    T::try_from(value.round() as i64).map_err(|_| format!("{column} out of range: {value}"))
}

fn required(value: Option<String>, column: &str) -> Result<String, String> {
    value.ok_or_else(|| format!("missing {column}"))
}

fn participant(id: Option<String>, name: Option<String>) -> Option<Participant> {
    id.map(|id| Participant { id, name })
}

impl TryFrom<RawGame> for Game {
    type Error = String;

    fn try_from(raw: RawGame) -> Result<Self, Self::Error> {
        let gameday = required(raw.gameday, "gameday")?;
        Ok(Game {
            game_id: required(raw.game_id, "game_id")?,
            season: small_int(raw.season, "season")?,
            week: small_int(raw.week, "week")?,
            home_team: required(raw.home_team, "home_team")?,
            away_team: required(raw.away_team, "away_team")?,
            gameday: NaiveDate::parse_from_str(&gameday, "%Y-%m-%d")
                .map_err(|e| format!("bad gameday '{gameday}': {e}"))?,
        })
    }
}

impl TryFrom<RawPlay> for Play {
    type Error = String;

    fn try_from(raw: RawPlay) -> Result<Self, Self::Error> {
        Ok(Play {
            play_id: small_int(raw.play_id, "play_id")?,
            game_id: required(raw.game_id, "game_id")?,
            week: small_int(raw.week.or(Some(0.0)), "week")?,
            posteam: raw.posteam,
            defteam: raw.defteam,
            play_type: raw
                .play_type
                .as_deref()
                .map(PlayType::from_raw)
                .unwrap_or_default(),
            qb_dropback: flag(raw.qb_dropback),
            epa: raw.epa,
            cpoe: raw.cpoe,
            complete_pass: flag(raw.complete_pass),
            pass_attempt: flag(raw.pass_attempt),
            pass_touchdown: flag(raw.pass_touchdown),
            rush_touchdown: flag(raw.rush_touchdown),
            interception: flag(raw.interception),
            sack: flag(raw.sack),
            first_down: flag(raw.first_down),
            fumble_lost: flag(raw.fumble_lost),
            yards_gained: amount(raw.yards_gained),
            passing_yards: amount(raw.passing_yards),
            rushing_yards: amount(raw.rushing_yards),
            receiving_yards: amount(raw.receiving_yards),
            air_yards: amount(raw.air_yards),
            yards_after_catch: amount(raw.yards_after_catch),
            passer: participant(raw.passer_player_id, raw.passer_player_name),
            rusher: participant(raw.rusher_player_id, raw.rusher_player_name),
            receiver: participant(raw.receiver_player_id, raw.receiver_player_name),
            desc: raw.desc,
            participation: None,
        })
    }
}

impl TryFrom<RawWeekly> for WeeklyStatRow {
    type Error = String;

    fn try_from(raw: RawWeekly) -> Result<Self, Self::Error> {
        let player_id = required(raw.player_id, "player_id")?;
        let player_name = raw
            .player_name
            .or(raw.player_display_name)
            .unwrap_or_else(|| player_id.clone());
        Ok(WeeklyStatRow {
            player_id,
            player_name,
            position: raw.position,
            recent_team: raw.recent_team,
            season: small_int(raw.season, "season")?,
            week: small_int(raw.week, "week")?,
            completions: amount(raw.completions),
            attempts: amount(raw.attempts),
            passing_yards: amount(raw.passing_yards),
            passing_tds: amount(raw.passing_tds),
            interceptions: amount(raw.interceptions),
            sacks: amount(raw.sacks),
            sack_yards: amount(raw.sack_yards),
            passing_epa: raw.passing_epa,
            dakota: raw.dakota,
            carries: amount(raw.carries),
            rushing_yards: amount(raw.rushing_yards),
            rushing_tds: amount(raw.rushing_tds),
            rushing_fumbles: amount(raw.rushing_fumbles),
            rushing_first_downs: amount(raw.rushing_first_downs),
            rushing_epa: raw.rushing_epa,
            receptions: amount(raw.receptions),
            targets: amount(raw.targets),
            receiving_yards: amount(raw.receiving_yards),
            receiving_tds: amount(raw.receiving_tds),
            receiving_air_yards: amount(raw.receiving_air_yards),
            receiving_yards_after_catch: amount(raw.receiving_yards_after_catch),
            receiving_first_downs: amount(raw.receiving_first_downs),
            receiving_epa: raw.receiving_epa,
            target_share: raw.target_share,
        })
    }
}

impl TryFrom<RawTeam> for TeamDescriptor {
    type Error = String;

    fn try_from(raw: RawTeam) -> Result<Self, Self::Error> {
        Ok(TeamDescriptor {
            team_abbr: required(raw.team_abbr, "team_abbr")?,
            team_name: required(raw.team_name, "team_name")?,
            team_id: raw.team_id,
            team_nick: raw.team_nick,
            team_conf: raw.team_conf,
            team_division: raw.team_division,
            team_color: raw.team_color,
            team_color2: raw.team_color2,
            team_logo_espn: raw.team_logo_espn,
            team_wordmark: raw.team_wordmark,
        })
    }
}

// --- Reader-based decoders ---

/// Only the first few malformed rows are logged individually.
const MAX_LOGGED_SKIPS: usize = 5;

/// Decodes every row of `reader`, skipping rows that fail to deserialize or
/// convert. Fails only when the header is unreadable or no row survives.
fn read_rows<R, Raw, T, F>(
    dataset: &'static str,
    reader: R,
    convert: F,
) -> Result<Vec<T>, ProviderError>
where
    R: Read,
    Raw: DeserializeOwned,
    F: Fn(Raw) -> Result<T, String>,
{
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    reader
        .headers()
        .map_err(|source| ProviderError::Csv { dataset, source })?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.deserialize::<Raw>() {
        match result.map_err(|e| e.to_string()).and_then(&convert) {
            Ok(row) => rows.push(row),
            Err(message) => {
                skipped += 1;
                if skipped <= MAX_LOGGED_SKIPS {
                    tracing::warn!(dataset, %message, "Skipping malformed row.");
                }
            }
        }
    }

    if rows.is_empty() && skipped > 0 {
        return Err(ProviderError::InvalidData {
            dataset,
            message: format!("all {skipped} rows were malformed"),
        });
    }
    if skipped > 0 {
        tracing::warn!(dataset, skipped, kept = rows.len(), "Skipped malformed rows.");
    }
    tracing::debug!(dataset, rows = rows.len(), "Decoded CSV.");
    Ok(rows)
}

/// Decodes a schedule file, keeping only `season` when given.
pub fn parse_games<R: Read>(reader: R, season: Option<u16>) -> Result<Vec<Game>, ProviderError> {
    let games = read_rows("schedules", reader, |raw: RawGame| Game::try_from(raw))?;
    Ok(match season {
        Some(season) => games.into_iter().filter(|g| g.season == season).collect(),
        None => games,
    })
}

pub fn parse_plays<R: Read>(reader: R) -> Result<Vec<Play>, ProviderError> {
    read_rows("play_by_play", reader, |raw: RawPlay| Play::try_from(raw))
}

/// Decodes a participation file into a lookup keyed by `(game_id, play_id)`.
pub fn parse_participation<R: Read>(
    reader: R,
) -> Result<HashMap<(String, u32), Participation>, ProviderError> {
    let rows = read_rows("participation", reader, |raw: RawParticipation| {
        let key = (
            required(raw.nflverse_game_id, "nflverse_game_id")?,
            small_int::<u32>(raw.play_id, "play_id")?,
        );
        let participation = Participation {
            offense_formation: raw.offense_formation,
            offense_personnel: raw.offense_personnel,
            defense_personnel: raw.defense_personnel,
            defenders_in_box: small_int(raw.defenders_in_box, "defenders_in_box").ok(),
            number_of_pass_rushers: small_int(raw.number_of_pass_rushers, "number_of_pass_rushers")
                .ok(),
        };
        Ok((key, participation))
    })?;
    Ok(rows.into_iter().collect())
}

/// Attaches participation rows to the plays they describe.
pub fn attach_participation(
    plays: &mut [Play],
    mut participation: HashMap<(String, u32), Participation>,
) {
    let mut matched = 0usize;
    for play in plays.iter_mut() {
        if let Some(row) = participation.remove(&(play.game_id.clone(), play.play_id)) {
            play.participation = Some(row);
            matched += 1;
        }
    }
    tracing::debug!(matched, plays = plays.len(), "Joined participation onto plays.");
}

pub fn parse_weekly<R: Read>(reader: R) -> Result<Vec<WeeklyStatRow>, ProviderError> {
    read_rows("weekly_stats", reader, |raw: RawWeekly| WeeklyStatRow::try_from(raw))
}

pub fn parse_teams<R: Read>(reader: R) -> Result<Vec<TeamDescriptor>, ProviderError> {
    read_rows("teams", reader, |raw: RawTeam| TeamDescriptor::try_from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_games_filters_season() {
        let csv = "\
game_id,season,game_type,week,gameday,away_team,home_team
2023_01_DET_KC,2023,REG,1,2023-09-07,DET,KC
2024_01_BAL_KC,2024,REG,1,2024-09-05,BAL,KC
2024_02_KC_CIN,2024,REG,2,2024-09-15,KC,CIN
";
        let games = parse_games(csv.as_bytes(), Some(2024)).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_id, "2024_01_BAL_KC");
        assert_eq!(games[0].gameday, NaiveDate::from_ymd_opt(2024, 9, 5).unwrap());
        assert_eq!(games[1].away_team, "KC");
    }

    #[test]
    fn test_parse_plays_handles_na_cells() {
        let csv = "\
play_id,game_id,week,posteam,defteam,play_type,qb_dropback,epa,cpoe,complete_pass,pass_attempt,sack,yards_gained,passing_yards,passer_player_id,passer_player_name,receiver_player_id,receiver_player_name,extra_column
40,2024_01_BAL_KC,1,KC,BAL,pass,1.0,0.52,NA,1,1,0,12,12,00-0033873,P.Mahomes,00-0036212,R.Rice,ignored
55,2024_01_BAL_KC,1,KC,BAL,no_play,0,,,0,0,0,NA,NA,NA,NA,NA,NA,ignored
";
        let plays = parse_plays(csv.as_bytes()).unwrap();
        assert_eq!(plays.len(), 2);

        let pass = &plays[0];
        assert_eq!(pass.play_id, 40);
        assert_eq!(pass.play_type, PlayType::Pass);
        assert!(pass.qb_dropback && pass.complete_pass && pass.pass_attempt);
        assert_eq!(pass.epa, Some(0.52));
        assert_eq!(pass.cpoe, None);
        assert_eq!(pass.passing_yards, 12.0);
        assert_eq!(pass.passer.as_ref().and_then(|p| p.name.as_deref()), Some("P.Mahomes"));

        let no_play = &plays[1];
        assert_eq!(no_play.play_type, PlayType::Other);
        assert_eq!(no_play.epa, None);
        assert_eq!(no_play.yards_gained, 0.0);
        assert!(no_play.passer.is_none());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let csv = "\
play_id,game_id,epa
1,2024_01_BAL_KC,0.1
2,,0.2
3,2024_01_BAL_KC,not-a-number
";
        let plays = parse_plays(csv.as_bytes()).unwrap();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].play_id, 1);
    }

    #[test]
    fn test_all_malformed_rows_is_an_error() {
        let csv = "play_id,game_id\n,x\n,y\n";
        let err = parse_plays(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidData { dataset: "play_by_play", .. }));
    }

    #[test]
    fn test_parse_weekly_accepts_renamed_columns() {
        let csv = "\
player_id,player_display_name,position,team,season,week,completions,attempts,passing_yards,passing_tds,passing_interceptions,sacks_suffered,sack_yards_lost,passing_epa,dakota
00-0033873,Patrick Mahomes,QB,KC,2024,1,20,28,291,1,1,2,14,6.5,NA
";
        let rows = parse_weekly(csv.as_bytes()).unwrap();
        let row = &rows[0];
        assert_eq!(row.player_name, "Patrick Mahomes");
        assert_eq!(row.recent_team.as_deref(), Some("KC"));
        assert_eq!(row.interceptions, 1.0);
        assert_eq!(row.sacks, 2.0);
        assert_eq!(row.sack_yards, 14.0);
        assert_eq!(row.passing_epa, Some(6.5));
        assert_eq!(row.dakota, None);
        assert_eq!(row.carries, 0.0);
    }

    #[test]
    fn test_participation_is_joined_by_game_and_play() {
        let csv = "\
nflverse_game_id,play_id,offense_formation,offense_personnel,defense_personnel,defenders_in_box,number_of_pass_rushers
2024_01_BAL_KC,40,SHOTGUN,\"1 RB, 1 TE, 3 WR\",\"4 DL, 2 LB, 5 DB\",6,4
";
        let participation = parse_participation(csv.as_bytes()).unwrap();
        let mut plays = vec![
            Play {
                play_id: 40,
                game_id: "2024_01_BAL_KC".to_string(),
                ..Default::default()
            },
            Play {
                play_id: 41,
                game_id: "2024_01_BAL_KC".to_string(),
                ..Default::default()
            },
        ];
        attach_participation(&mut plays, participation);

        let joined = plays[0].participation.as_ref().unwrap();
        assert_eq!(joined.offense_formation.as_deref(), Some("SHOTGUN"));
        assert_eq!(joined.defenders_in_box, Some(6));
        assert!(plays[1].participation.is_none());
    }

    #[test]
    fn test_parse_teams() {
        let csv = "\
team_abbr,team_name,team_id,team_nick,team_conf,team_division,team_color,team_color2,team_logo_espn
KC,Kansas City Chiefs,2310,Chiefs,AFC,AFC West,#E31837,#FFB612,https://a.espncdn.com/kc.png
";
        let teams = parse_teams(csv.as_bytes()).unwrap();
        assert_eq!(teams[0].team_abbr, "KC");
        assert_eq!(teams[0].team_division.as_deref(), Some("AFC West"));
        assert_eq!(teams[0].team_wordmark, None);
    }
}
