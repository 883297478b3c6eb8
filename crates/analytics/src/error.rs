use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No games found for team {0}")]
    NoGamesForTeam(String),

    #[error("No games played by team {team} on or before {as_of}")]
    NoPastGames { team: String, as_of: NaiveDate },

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Calculation error: Division by zero encountered in metric '{0}'")]
    DivisionByZero(String),
}

impl AnalyticsError {
    /// True for the variants that mean "nothing matched the request" rather
    /// than "the calculation went wrong".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AnalyticsError::NoGamesForTeam(_)
                | AnalyticsError::NoPastGames { .. }
                | AnalyticsError::NotEnoughData(_)
        )
    }
}
