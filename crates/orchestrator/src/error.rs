use analytics::AnalyticsError;
use data_provider::error::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Nothing matched the request: unknown team, no played games, no plays
    /// for the role, no qualified players.
    #[error("{0}")]
    NotFound(String),

    #[error("Upstream data error: {0}")]
    Upstream(#[from] ProviderError),

    #[error("Analytics error: {0}")]
    Analytics(AnalyticsError),
}

impl From<AnalyticsError> for OrchestratorError {
    fn from(err: AnalyticsError) -> Self {
        if err.is_not_found() {
            OrchestratorError::NotFound(err.to_string())
        } else {
            OrchestratorError::Analytics(err)
        }
    }
}
