use crate::error::AnalyticsError;
use crate::filter::is_role_play;
use crate::report::{
    FieldAverage, LeagueAverage, PassingLine, PerformanceRecord, QbPerformance, RbPerformance,
    WrPerformance,
};
use crate::stats::{
    count, distinct_games, mean_defined, mode_name, ratio, success_rate, sum_defined, total,
};
use core_types::{Play, Role};
use std::collections::BTreeMap;

/// A stateless calculator for deriving player metrics from play-by-play data.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches to the aggregator of `role`.
    ///
    /// `team_plays` is only read for quarterbacks, where it supplies the sack
    /// yardage.
    pub fn aggregate(
        &self,
        role: Role,
        role_plays: &[&Play],
        team_plays: &[&Play],
    ) -> PerformanceRecord {
        match role {
            Role::Qb => PerformanceRecord::Qb(self.aggregate_qb(role_plays, team_plays)),
            Role::Rb => PerformanceRecord::Rb(self.aggregate_rb(role_plays)),
            Role::Wr => PerformanceRecord::Wr(self.aggregate_wr(role_plays)),
        }
    }

    /// Quarterback aggregate.
    ///
    /// # Arguments
    ///
    /// * `qb_plays` - The team's dropbacks in the sample.
    /// * `team_plays` - Every play of the team's offense over the same games.
    ///   Sack yardage is read from here because it is recorded in
    ///   `yards_gained`, not in the passing columns.
    pub fn aggregate_qb(&self, qb_plays: &[&Play], team_plays: &[&Play]) -> QbPerformance {
        let completions = count(qb_plays, |p| p.complete_pass);
        let attempts = count(qb_plays, |p| p.pass_attempt);
        let passing_yards = total(qb_plays, |p| p.passing_yards);
        let touchdowns = count(qb_plays, |p| p.pass_touchdown);
        let interceptions = count(qb_plays, |p| p.interception);
        let sacks = count(qb_plays, |p| p.sack);
        // Stored as a negative gain; report it as a positive loss.
        let sack_yards_lost = 0.0
            - team_plays
                .iter()
                .filter(|p| p.sack)
                .map(|p| p.yards_gained)
                .sum::<f64>();

        let line = PassingLine {
            passing_yards,
            touchdowns,
            interceptions,
            sack_yards_lost,
            attempts,
            sacks,
        };
        let any_a = match line.any_a() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(error = %e, "ANY/A undefined for sample.");
                None
            }
        };

        QbPerformance {
            qb_name: mode_name(
                qb_plays
                    .iter()
                    .filter_map(|p| Role::Qb.named_participant(p)?.name.as_deref()),
            ),
            games: distinct_games(qb_plays),
            plays: qb_plays.len() as f64,
            epa: sum_defined(qb_plays.iter().map(|p| p.epa)),
            epa_per_play: mean_defined(qb_plays.iter().map(|p| p.epa)),
            cpoe: mean_defined(qb_plays.iter().map(|p| p.cpoe)),
            completion_percentage: ratio(completions, attempts).map_or(0.0, |r| r * 100.0),
            completions,
            attempts,
            passing_yards,
            touchdowns,
            interceptions,
            sacks,
            sack_yards_lost,
            any_a,
        }
    }

    pub fn aggregate_rb(&self, rb_plays: &[&Play]) -> RbPerformance {
        let carries = rb_plays.len() as f64;
        let rushing_yards = total(rb_plays, |p| p.rushing_yards);
        RbPerformance {
            rusher_name: mode_name(
                rb_plays
                    .iter()
                    .filter_map(|p| Role::Rb.named_participant(p)?.name.as_deref()),
            ),
            games: distinct_games(rb_plays),
            carries,
            rushing_yards,
            yards_per_carry: ratio(rushing_yards, carries),
            rushing_tds: count(rb_plays, |p| p.rush_touchdown),
            first_downs: count(rb_plays, |p| p.first_down),
            fumbles_lost: count(rb_plays, |p| p.fumble_lost),
            epa: sum_defined(rb_plays.iter().map(|p| p.epa)),
            epa_per_play: mean_defined(rb_plays.iter().map(|p| p.epa)),
            success_rate: success_rate(rb_plays),
        }
    }

    pub fn aggregate_wr(&self, wr_plays: &[&Play]) -> WrPerformance {
        let targets = wr_plays.len() as f64;
        let receptions = count(wr_plays, |p| p.complete_pass);
        let receiving_yards = total(wr_plays, |p| p.receiving_yards);
        WrPerformance {
            receiver_name: mode_name(
                wr_plays
                    .iter()
                    .filter_map(|p| Role::Wr.named_participant(p)?.name.as_deref()),
            ),
            games: distinct_games(wr_plays),
            targets,
            receptions,
            receiving_yards,
            receiving_tds: count(wr_plays, |p| p.pass_touchdown),
            air_yards: total(wr_plays, |p| p.air_yards),
            yards_after_catch: total(wr_plays, |p| p.yards_after_catch),
            first_downs: count(wr_plays, |p| p.first_down),
            catch_rate: ratio(receptions, targets),
            yards_per_target: ratio(receiving_yards, targets),
            epa: sum_defined(wr_plays.iter().map(|p| p.epa)),
            epa_per_play: mean_defined(wr_plays.iter().map(|p| p.epa)),
            success_rate: success_rate(wr_plays),
        }
    }

    /// League-wide average for `role` over players with more than `min_snaps` plays.
    ///
    /// Each qualified player is aggregated on their own plays, then the
    /// per-player records are averaged field by field.
    pub fn league_average(
        &self,
        role: Role,
        plays: &[Play],
        min_snaps: usize,
    ) -> Result<LeagueAverage<PerformanceRecord>, AnalyticsError> {
        let mut by_player: BTreeMap<&str, Vec<&Play>> = BTreeMap::new();
        for play in plays.iter().filter(|p| is_role_play(p, role)) {
            if let Some(player) = role.participant(play) {
                by_player.entry(player.id.as_str()).or_default().push(play);
            }
        }

        let qualified: Vec<&Vec<&Play>> = by_player
            .values()
            .filter(|player_plays| player_plays.len() > min_snaps)
            .collect();

        if qualified.is_empty() {
            return Err(AnalyticsError::NotEnoughData(format!(
                "no {role} had more than {min_snaps} snaps"
            )));
        }

        tracing::debug!(
            role = %role,
            players = by_player.len(),
            qualified = qualified.len(),
            "Computing league average."
        );

        let averages = match role {
            Role::Qb => {
                let records: Vec<QbPerformance> = qualified
                    .iter()
                    .map(|own| self.aggregate_qb(own, own))
                    .collect();
                PerformanceRecord::Qb(QbPerformance::field_average(&records))
            }
            Role::Rb => {
                let records: Vec<RbPerformance> =
                    qualified.iter().map(|own| self.aggregate_rb(own)).collect();
                PerformanceRecord::Rb(RbPerformance::field_average(&records))
            }
            Role::Wr => {
                let records: Vec<WrPerformance> =
                    qualified.iter().map(|own| self.aggregate_wr(own)).collect();
                PerformanceRecord::Wr(WrPerformance::field_average(&records))
            }
        };

        Ok(LeagueAverage {
            qualified_players: qualified.len(),
            min_snaps,
            averages,
        })
    }
}
