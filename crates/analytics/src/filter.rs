//! Selects the plays that belong to a team and position group.
//!
//! Every function here borrows its input and returns references into it; an
//! empty result is a normal outcome and is left to the caller to interpret.

use core_types::{Play, PlayType, Role};
use std::collections::{BTreeSet, HashSet};

/// The role predicate without the team restriction.
///
/// - QB: dropbacks that are passes or runs, so sacks and scrambles count.
/// - RB: runs with a named rusher.
/// - WR: passes with a named receiver.
pub fn is_role_play(play: &Play, role: Role) -> bool {
    match role {
        Role::Qb => matches!(play.play_type, PlayType::Pass | PlayType::Run) && play.qb_dropback,
        Role::Rb => play.play_type == PlayType::Run && play.rusher.is_some(),
        Role::Wr => play.play_type == PlayType::Pass && play.receiver.is_some(),
    }
}

/// Plays where `team` is on offense and the play belongs to `role`.
pub fn filter_by_role<'a, I>(plays: I, team: &str, role: Role) -> Vec<&'a Play>
where
    I: IntoIterator<Item = &'a Play>,
{
    plays
        .into_iter()
        .filter(|p| p.is_offense(team) && is_role_play(p, role))
        .collect()
}

/// Plays where `team` is on offense.
pub fn offense_plays<'a, I>(plays: I, team: &str) -> Vec<&'a Play>
where
    I: IntoIterator<Item = &'a Play>,
{
    plays.into_iter().filter(|p| p.is_offense(team)).collect()
}

/// Plays belonging to any of the given games.
pub fn plays_in_games<'a>(plays: &'a [Play], game_ids: &[String]) -> Vec<&'a Play> {
    let ids: HashSet<&str> = game_ids.iter().map(String::as_str).collect();
    plays
        .iter()
        .filter(|p| ids.contains(p.game_id.as_str()))
        .collect()
}

/// The distinct ids of the players the plays are attributed to for `role`.
pub fn role_player_ids(plays: &[&Play], role: Role) -> BTreeSet<String> {
    plays
        .iter()
        .filter_map(|p| role.participant(p))
        .map(|participant| participant.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Participant;

    fn play(posteam: &str, play_type: PlayType, dropback: bool) -> Play {
        Play {
            game_id: "g1".to_string(),
            posteam: Some(posteam.to_string()),
            play_type,
            qb_dropback: dropback,
            ..Default::default()
        }
    }

    fn sample() -> Vec<Play> {
        let runner = Some(Participant::new("rb1", Some("I.Pacheco")));
        let target = Some(Participant::new("wr1", Some("R.Rice")));
        vec![
            Play {
                receiver: target.clone(),
                ..play("KC", PlayType::Pass, true)
            },
            Play {
                rusher: Some(Participant::new("qb1", Some("P.Mahomes"))),
                ..play("KC", PlayType::Run, true)
            },
            Play {
                rusher: runner.clone(),
                ..play("KC", PlayType::Run, false)
            },
            play("KC", PlayType::Other, true),
            Play {
                receiver: target,
                ..play("BAL", PlayType::Pass, true)
            },
            Play {
                rusher: runner,
                ..play("BAL", PlayType::Run, false)
            },
            Play {
                posteam: None,
                ..play("KC", PlayType::Other, false)
            },
            play("KC", PlayType::Pass, false),
        ]
    }

    #[test]
    fn test_qb_filter_only_returns_team_dropbacks() {
        let plays = sample();
        let qb = filter_by_role(&plays, "KC", Role::Qb);
        assert_eq!(qb.len(), 2);
        for p in qb {
            assert!(p.is_offense("KC"));
            assert!(p.qb_dropback);
            assert!(matches!(p.play_type, PlayType::Pass | PlayType::Run));
        }
    }

    #[test]
    fn test_rb_and_wr_filters_require_a_named_player() {
        let plays = sample();
        let rb = filter_by_role(&plays, "KC", Role::Rb);
        // The designed run and the scramble both have a rusher.
        assert_eq!(rb.len(), 2);
        assert!(rb.iter().all(|p| p.play_type == PlayType::Run && p.rusher.is_some()));

        let wr = filter_by_role(&plays, "KC", Role::Wr);
        assert_eq!(wr.len(), 1);
        assert!(wr[0].receiver.is_some());
    }

    #[test]
    fn test_filter_does_not_touch_input_and_may_be_empty() {
        let plays = sample();
        let before = plays.clone();
        assert!(filter_by_role(&plays, "BUF", Role::Qb).is_empty());
        assert_eq!(plays, before);
    }

    #[test]
    fn test_plays_in_games_and_offense_plays() {
        let mut plays = sample();
        plays[0].game_id = "g2".to_string();
        let selected = plays_in_games(&plays, &["g2".to_string()]);
        assert_eq!(selected.len(), 1);

        let kc = offense_plays(&plays, "KC");
        assert_eq!(kc.len(), 5);
    }

    #[test]
    fn test_role_player_ids() {
        let plays = sample();
        let qb = filter_by_role(&plays, "KC", Role::Qb);
        // The scramble is attributed to the quarterback through the rusher column.
        assert_eq!(role_player_ids(&qb, Role::Qb), BTreeSet::from(["qb1".to_string()]));
        let rb = filter_by_role(&plays, "KC", Role::Rb);
        assert_eq!(role_player_ids(&rb, Role::Rb).len(), 2);
    }
}
