//! Small numeric helpers shared by the aggregators.

use core_types::Play;
use std::collections::{BTreeSet, HashMap};

/// Sum of the defined values, `None` when there are none.
pub(crate) fn sum_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Mean of the defined values, `None` when there are none.
pub(crate) fn mean_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// `numerator / denominator`, `None` when the denominator is zero.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator != 0.0).then(|| numerator / denominator)
}

/// Number of plays where `flag` holds, as a float.
pub(crate) fn count<F>(plays: &[&Play], flag: F) -> f64
where
    F: Fn(&Play) -> bool,
{
    plays.iter().filter(|p| flag(p)).count() as f64
}

/// Sum of a yardage column.
pub(crate) fn total<F>(plays: &[&Play], column: F) -> f64
where
    F: Fn(&Play) -> f64,
{
    plays.iter().map(|p| column(p)).sum()
}

/// The most frequent name. Ties go to the lexicographically smallest name.
pub(crate) fn mode_name<'a, I>(names: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(a_name, a_n), (b_name, b_n)| a_n.cmp(b_n).then_with(|| b_name.cmp(a_name)))
        .map(|(name, _)| name.to_string())
}

/// Sorted distinct game ids.
pub(crate) fn distinct_games(plays: &[&Play]) -> Vec<String> {
    plays
        .iter()
        .map(|p| p.game_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Share of plays with a defined EPA where the EPA was positive.
pub(crate) fn success_rate(plays: &[&Play]) -> Option<f64> {
    let defined: Vec<f64> = plays.iter().filter_map(|p| p.epa).collect();
    ratio(
        defined.iter().filter(|epa| **epa > 0.0).count() as f64,
        defined.len() as f64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_values_are_skipped() {
        let values = [Some(1.0), None, Some(2.0)];
        assert_eq!(sum_defined(values), Some(3.0));
        assert_eq!(mean_defined(values), Some(1.5));
    }

    #[test]
    fn test_all_null_is_none() {
        assert_eq!(sum_defined([None, None]), None);
        assert_eq!(mean_defined(Vec::<Option<f64>>::new()), None);
        assert_eq!(ratio(1.0, 0.0), None);
    }

    #[test]
    fn test_mode_name_breaks_ties_alphabetically() {
        assert_eq!(mode_name(["B.Bob", "A.Al", "B.Bob"]), Some("B.Bob".to_string()));
        assert_eq!(mode_name(["Z.Zed", "A.Al"]), Some("A.Al".to_string()));
        assert_eq!(mode_name(std::iter::empty()), None);
    }

    #[test]
    fn test_success_rate_ignores_null_epa() {
        let plays = [
            Play {
                epa: Some(0.5),
                ..Default::default()
            },
            Play {
                epa: Some(-0.2),
                ..Default::default()
            },
            Play {
                epa: None,
                ..Default::default()
            },
        ];
        let refs: Vec<&Play> = plays.iter().collect();
        assert_eq!(success_rate(&refs), Some(0.5));
    }
}
