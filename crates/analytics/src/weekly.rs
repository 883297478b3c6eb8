//! Per-player, per-week splits built from the provider's weekly box scores.

use crate::report::PassingLine;
use crate::stats::{mean_defined, sum_defined};
use core_types::{Role, WeeklyStatRow};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QbWeekly {
    pub player_id: String,
    pub player_name: String,
    pub week: u8,
    pub passing_epa: Option<f64>,
    pub rushing_epa: Option<f64>,
    pub completions: f64,
    pub attempts: f64,
    pub passing_yards: f64,
    pub passing_tds: f64,
    pub interceptions: f64,
    pub sacks: f64,
    pub sack_yards: f64,
    pub dakota: Option<f64>,
    pub any_a: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RbWeekly {
    pub player_id: String,
    pub player_name: String,
    pub week: u8,
    pub rushing_epa: Option<f64>,
    pub rushing_yards: f64,
    pub carries: f64,
    pub rushing_tds: f64,
    pub rushing_fumbles: f64,
    pub rushing_first_downs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrWeekly {
    pub player_id: String,
    pub player_name: String,
    pub week: u8,
    pub receptions: f64,
    pub targets: f64,
    pub receiving_yards: f64,
    pub receiving_tds: f64,
    pub receiving_air_yards: f64,
    pub receiving_yards_after_catch: f64,
    pub receiving_epa: Option<f64>,
    pub receiving_first_downs: f64,
    pub target_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WeeklyRecord {
    Qb(QbWeekly),
    Rb(RbWeekly),
    Wr(WrWeekly),
}

impl WeeklyRecord {
    pub fn player_id(&self) -> &str {
        match self {
            WeeklyRecord::Qb(r) => &r.player_id,
            WeeklyRecord::Rb(r) => &r.player_id,
            WeeklyRecord::Wr(r) => &r.player_id,
        }
    }

    pub fn week(&self) -> u8 {
        match self {
            WeeklyRecord::Qb(r) => r.week,
            WeeklyRecord::Rb(r) => r.week,
            WeeklyRecord::Wr(r) => r.week,
        }
    }
}

fn sum(rows: &[&WeeklyStatRow], column: impl Fn(&WeeklyStatRow) -> f64) -> f64 {
    rows.iter().map(|r| column(r)).sum()
}

/// Groups the weekly rows of `player_ids` by `(player_id, week)` and reduces
/// each group to one record for `role`. Output is ordered by player id, then week.
pub fn aggregate_weekly(
    role: Role,
    rows: &[WeeklyStatRow],
    player_ids: &BTreeSet<String>,
) -> Vec<WeeklyRecord> {
    let mut groups: BTreeMap<(&str, u8), Vec<&WeeklyStatRow>> = BTreeMap::new();
    for row in rows.iter().filter(|r| player_ids.contains(&r.player_id)) {
        groups
            .entry((row.player_id.as_str(), row.week))
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|((player_id, week), group)| {
            // Groups are never empty.
            let player_name = group
                .first()
                .map(|r| r.player_name.clone())
                .unwrap_or_default();
            let player_id = player_id.to_string();
            match role {
                Role::Qb => WeeklyRecord::Qb(qb_week(player_id, player_name, week, &group)),
                Role::Rb => WeeklyRecord::Rb(RbWeekly {
                    player_id,
                    player_name,
                    week,
                    rushing_epa: sum_defined(group.iter().map(|r| r.rushing_epa)),
                    rushing_yards: sum(&group, |r| r.rushing_yards),
                    carries: sum(&group, |r| r.carries),
                    rushing_tds: sum(&group, |r| r.rushing_tds),
                    rushing_fumbles: sum(&group, |r| r.rushing_fumbles),
                    rushing_first_downs: sum(&group, |r| r.rushing_first_downs),
                }),
                Role::Wr => WeeklyRecord::Wr(WrWeekly {
                    player_id,
                    player_name,
                    week,
                    receptions: sum(&group, |r| r.receptions),
                    targets: sum(&group, |r| r.targets),
                    receiving_yards: sum(&group, |r| r.receiving_yards),
                    receiving_tds: sum(&group, |r| r.receiving_tds),
                    receiving_air_yards: sum(&group, |r| r.receiving_air_yards),
                    receiving_yards_after_catch: sum(&group, |r| r.receiving_yards_after_catch),
                    receiving_epa: sum_defined(group.iter().map(|r| r.receiving_epa)),
                    receiving_first_downs: sum(&group, |r| r.receiving_first_downs),
                    target_share: mean_defined(group.iter().map(|r| r.target_share)),
                }),
            }
        })
        .collect()
}

fn qb_week(
    player_id: String,
    player_name: String,
    week: u8,
    group: &[&WeeklyStatRow],
) -> QbWeekly {
    let line = PassingLine {
        passing_yards: sum(group, |r| r.passing_yards),
        touchdowns: sum(group, |r| r.passing_tds),
        interceptions: sum(group, |r| r.interceptions),
        sack_yards_lost: sum(group, |r| r.sack_yards),
        attempts: sum(group, |r| r.attempts),
        sacks: sum(group, |r| r.sacks),
    };
    QbWeekly {
        player_id,
        player_name,
        week,
        passing_epa: sum_defined(group.iter().map(|r| r.passing_epa)),
        rushing_epa: sum_defined(group.iter().map(|r| r.rushing_epa)),
        completions: sum(group, |r| r.completions),
        attempts: line.attempts,
        passing_yards: line.passing_yards,
        passing_tds: line.touchdowns,
        interceptions: line.interceptions,
        sacks: line.sacks,
        sack_yards: line.sack_yards_lost,
        dakota: mean_defined(group.iter().map(|r| r.dakota)),
        any_a: line.any_a().ok(),
    }
}
