use crate::enums::PlayType;
use crate::season::same_team;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single scheduled game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub season: u16,
    pub week: u8,
    pub home_team: String,
    pub away_team: String,
    /// The calendar date the game is (or was) played on.
    pub gameday: NaiveDate,
}

impl Game {
    /// Returns true if `team` is either participant.
    pub fn involves(&self, team: &str) -> bool {
        same_team(&self.home_team, team) || same_team(&self.away_team, team)
    }
}

/// A named player attached to a play in some role (passer, rusher, receiver).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.map(str::to_string),
        }
    }
}

/// Formation and personnel columns, only present when participation was requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub offense_formation: Option<String>,
    pub offense_personnel: Option<String>,
    pub defense_personnel: Option<String>,
    pub defenders_in_box: Option<u8>,
    pub number_of_pass_rushers: Option<u8>,
}

/// One play-by-play row.
///
/// Yardage columns read as `0.0` when the provider leaves them empty, which is
/// what a null-skipping sum would produce anyway. EPA and CPOE stay nullable
/// because they feed means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub play_id: u32,
    pub game_id: String,
    pub week: u8,
    /// The team in possession.
    pub posteam: Option<String>,
    pub defteam: Option<String>,
    pub play_type: PlayType,
    pub qb_dropback: bool,
    pub epa: Option<f64>,
    pub cpoe: Option<f64>,

    pub complete_pass: bool,
    pub pass_attempt: bool,
    pub pass_touchdown: bool,
    pub rush_touchdown: bool,
    pub interception: bool,
    pub sack: bool,
    pub first_down: bool,
    pub fumble_lost: bool,

    pub yards_gained: f64,
    pub passing_yards: f64,
    pub rushing_yards: f64,
    pub receiving_yards: f64,
    pub air_yards: f64,
    pub yards_after_catch: f64,

    pub passer: Option<Participant>,
    pub rusher: Option<Participant>,
    pub receiver: Option<Participant>,

    pub desc: Option<String>,
    pub participation: Option<Participation>,
}

impl Play {
    /// Returns true if `team` had the ball on this play.
    pub fn is_offense(&self, team: &str) -> bool {
        self.posteam
            .as_deref()
            .is_some_and(|posteam| same_team(posteam, team))
    }
}

/// One player's box score for one week of one season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStatRow {
    pub player_id: String,
    pub player_name: String,
    pub position: Option<String>,
    pub recent_team: Option<String>,
    pub season: u16,
    pub week: u8,

    // Passing
    pub completions: f64,
    pub attempts: f64,
    pub passing_yards: f64,
    pub passing_tds: f64,
    pub interceptions: f64,
    pub sacks: f64,
    pub sack_yards: f64,
    pub passing_epa: Option<f64>,
    pub dakota: Option<f64>,

    // Rushing
    pub carries: f64,
    pub rushing_yards: f64,
    pub rushing_tds: f64,
    pub rushing_fumbles: f64,
    pub rushing_first_downs: f64,
    pub rushing_epa: Option<f64>,

    // Receiving
    pub receptions: f64,
    pub targets: f64,
    pub receiving_yards: f64,
    pub receiving_tds: f64,
    pub receiving_air_yards: f64,
    pub receiving_yards_after_catch: f64,
    pub receiving_first_downs: f64,
    pub receiving_epa: Option<f64>,
    pub target_share: Option<f64>,
}

/// Static team information (names, conference, colors, logos).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDescriptor {
    pub team_abbr: String,
    pub team_name: String,
    pub team_id: Option<String>,
    pub team_nick: Option<String>,
    pub team_conf: Option<String>,
    pub team_division: Option<String>,
    pub team_color: Option<String>,
    pub team_color2: Option<String>,
    pub team_logo_espn: Option<String>,
    pub team_wordmark: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_involves_is_case_insensitive() {
        let game = Game {
            game_id: "2024_01_BAL_KC".to_string(),
            season: 2024,
            week: 1,
            home_team: "KC".to_string(),
            away_team: "BAL".to_string(),
            gameday: NaiveDate::from_ymd_opt(2024, 9, 5).unwrap(),
        };
        assert!(game.involves("kc"));
        assert!(game.involves("BAL"));
        assert!(!game.involves("BUF"));
    }

    #[test]
    fn test_play_offense_requires_posteam() {
        let play = Play {
            posteam: Some("KC".to_string()),
            ..Default::default()
        };
        assert!(play.is_offense("kc"));
        assert!(!play.is_offense("BAL"));
        assert!(!Play::default().is_offense("KC"));
    }
}
