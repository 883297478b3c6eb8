use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};

/// Returns the NFL season that is "current" on the given date.
///
/// A season is named after the year it kicks off in September and runs into
/// February of the following year.
pub fn current_season(today: NaiveDate) -> u16 {
    let year = today.year();
    let season = if today.month() >= 9 { year } else { year - 1 };
    u16::try_from(season).unwrap_or(u16::MAX)
}

/// Canonical form of a team abbreviation (trimmed, upper-case).
pub fn normalize_team(team: &str) -> String {
    team.trim().to_ascii_uppercase()
}

/// Validates a team abbreviation from user input and returns its canonical form.
///
/// Abbreviations are two to three ASCII letters (`KC`, `LAR`).
pub fn parse_team(team: &str) -> Result<String, CoreError> {
    let trimmed = team.trim();
    if !(2..=3).contains(&trimmed.len()) || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CoreError::InvalidInput(
            "team".to_string(),
            format!("'{trimmed}' is not a team abbreviation"),
        ));
    }
    Ok(normalize_team(trimmed))
}

/// Compares two team abbreviations the way `normalize_team` would, without allocating.
pub fn same_team(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_season_boundaries() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(current_season(d(2024, 9, 1)), 2024);
        assert_eq!(current_season(d(2024, 12, 31)), 2024);
        assert_eq!(current_season(d(2025, 2, 9)), 2024);
        assert_eq!(current_season(d(2025, 8, 31)), 2024);
    }

    #[test]
    fn test_normalize_team() {
        assert_eq!(normalize_team(" kc "), "KC");
        assert!(same_team(" kc", "KC "));
        assert!(!same_team("KC", "KCC"));
    }

    #[test]
    fn test_parse_team() {
        assert_eq!(parse_team("lar"), Ok("LAR".to_string()));
        assert!(parse_team("K").is_err());
        assert!(parse_team("KC1").is_err());
        assert!(parse_team("CHIEFS").is_err());
    }
}
