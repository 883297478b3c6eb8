use crate::error::AnalyticsError;
use crate::stats::mean_defined;
use serde::{Deserialize, Serialize};

/// Aggregated quarterback performance over a set of plays.
///
/// Every statistic is a float so the same struct can carry a single player's
/// totals and a league-wide average.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QbPerformance {
    /// The passer seen most often in the sample.
    pub qb_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub games: Vec<String>,
    pub plays: f64,
    pub epa: Option<f64>,
    pub epa_per_play: Option<f64>,
    pub cpoe: Option<f64>,
    pub completion_percentage: f64,
    pub completions: f64,
    pub attempts: f64,
    pub passing_yards: f64,
    pub touchdowns: f64,
    pub interceptions: f64,
    pub sacks: f64,
    pub sack_yards_lost: f64,
    /// Adjusted net yards per attempt. Null when there were no dropbacks.
    pub any_a: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RbPerformance {
    pub rusher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub games: Vec<String>,
    pub carries: f64,
    pub rushing_yards: f64,
    pub yards_per_carry: Option<f64>,
    pub rushing_tds: f64,
    pub first_downs: f64,
    pub fumbles_lost: f64,
    pub epa: Option<f64>,
    pub epa_per_play: Option<f64>,
    pub success_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WrPerformance {
    pub receiver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub games: Vec<String>,
    pub targets: f64,
    pub receptions: f64,
    pub receiving_yards: f64,
    pub receiving_tds: f64,
    pub air_yards: f64,
    pub yards_after_catch: f64,
    pub first_downs: f64,
    pub catch_rate: Option<f64>,
    pub yards_per_target: Option<f64>,
    pub epa: Option<f64>,
    pub epa_per_play: Option<f64>,
    pub success_rate: Option<f64>,
}

/// A performance aggregate for any role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PerformanceRecord {
    Qb(QbPerformance),
    Rb(RbPerformance),
    Wr(WrPerformance),
}

impl PerformanceRecord {
    /// The game ids the aggregate was computed over.
    pub fn games(&self) -> &[String] {
        match self {
            PerformanceRecord::Qb(r) => &r.games,
            PerformanceRecord::Rb(r) => &r.games,
            PerformanceRecord::Wr(r) => &r.games,
        }
    }
}

/// A field-wise average over the players who cleared the snap threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueAverage<R> {
    pub qualified_players: usize,
    pub min_snaps: usize,
    #[serde(flatten)]
    pub averages: R,
}

/// The inputs of adjusted net yards per attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassingLine {
    pub passing_yards: f64,
    pub touchdowns: f64,
    pub interceptions: f64,
    /// Positive number of yards lost to sacks.
    pub sack_yards_lost: f64,
    pub attempts: f64,
    pub sacks: f64,
}

impl PassingLine {
    /// `(yards + 20*TD - 45*INT - sack yards) / (attempts + sacks)`.
    pub fn any_a(&self) -> Result<f64, AnalyticsError> {
        let dropbacks = self.attempts + self.sacks;
        if dropbacks == 0.0 {
            return Err(AnalyticsError::DivisionByZero("any_a".to_string()));
        }
        Ok((self.passing_yards + 20.0 * self.touchdowns
            - 45.0 * self.interceptions
            - self.sack_yards_lost)
            / dropbacks)
    }
}

/// Record types that can be averaged across players.
pub(crate) trait FieldAverage: Sized {
    fn field_average(records: &[Self]) -> Self;
}

fn mean_of<T>(records: &[T], field: impl Fn(&T) -> f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(field).sum::<f64>() / records.len() as f64
}

fn mean_of_defined<T>(records: &[T], field: impl Fn(&T) -> Option<f64>) -> Option<f64> {
    mean_defined(records.iter().map(field))
}

impl FieldAverage for QbPerformance {
    fn field_average(records: &[Self]) -> Self {
        Self {
            qb_name: None,
            games: Vec::new(),
            plays: mean_of(records, |r| r.plays),
            epa: mean_of_defined(records, |r| r.epa),
            epa_per_play: mean_of_defined(records, |r| r.epa_per_play),
            cpoe: mean_of_defined(records, |r| r.cpoe),
            completion_percentage: mean_of(records, |r| r.completion_percentage),
            completions: mean_of(records, |r| r.completions),
            attempts: mean_of(records, |r| r.attempts),
            passing_yards: mean_of(records, |r| r.passing_yards),
            touchdowns: mean_of(records, |r| r.touchdowns),
            interceptions: mean_of(records, |r| r.interceptions),
            sacks: mean_of(records, |r| r.sacks),
            sack_yards_lost: mean_of(records, |r| r.sack_yards_lost),
            any_a: mean_of_defined(records, |r| r.any_a),
        }
    }
}

impl FieldAverage for RbPerformance {
    fn field_average(records: &[Self]) -> Self {
        Self {
            rusher_name: None,
            games: Vec::new(),
            carries: mean_of(records, |r| r.carries),
            rushing_yards: mean_of(records, |r| r.rushing_yards),
            yards_per_carry: mean_of_defined(records, |r| r.yards_per_carry),
            rushing_tds: mean_of(records, |r| r.rushing_tds),
            first_downs: mean_of(records, |r| r.first_downs),
            fumbles_lost: mean_of(records, |r| r.fumbles_lost),
            epa: mean_of_defined(records, |r| r.epa),
            epa_per_play: mean_of_defined(records, |r| r.epa_per_play),
            success_rate: mean_of_defined(records, |r| r.success_rate),
        }
    }
}

impl FieldAverage for WrPerformance {
    fn field_average(records: &[Self]) -> Self {
        Self {
            receiver_name: None,
            games: Vec::new(),
            targets: mean_of(records, |r| r.targets),
            receptions: mean_of(records, |r| r.receptions),
            receiving_yards: mean_of(records, |r| r.receiving_yards),
            receiving_tds: mean_of(records, |r| r.receiving_tds),
            air_yards: mean_of(records, |r| r.air_yards),
            yards_after_catch: mean_of(records, |r| r.yards_after_catch),
            first_downs: mean_of(records, |r| r.first_downs),
            catch_rate: mean_of_defined(records, |r| r.catch_rate),
            yards_per_target: mean_of_defined(records, |r| r.yards_per_target),
            epa: mean_of_defined(records, |r| r.epa),
            epa_per_play: mean_of_defined(records, |r| r.epa_per_play),
            success_rate: mean_of_defined(records, |r| r.success_rate),
        }
    }
}
