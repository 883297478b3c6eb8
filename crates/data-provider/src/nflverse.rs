use crate::error::ProviderError;
use crate::rows;
use crate::DataProvider;
use async_trait::async_trait;
use configuration::{ProviderConfig, SEASON_PLACEHOLDER};
use core_types::{Game, Play, TeamDescriptor, WeeklyStatRow};
use std::sync::Arc;
use std::time::Duration;

/// A concrete implementation of the `DataProvider` backed by the public
/// nflverse CSV releases.
#[derive(Clone)]
pub struct NflverseClient {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl NflverseClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("gridiron/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Requests one file, failing on a non-success status.
    async fn download(&self, url: &str) -> Result<reqwest::Response, ProviderError> {
        tracing::info!(%url, "Downloading dataset.");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// Downloads one file and decodes it on the blocking pool; the season files
    /// are large enough that decoding on a runtime worker would stall it.
    async fn fetch<T, F>(&self, url: &str, decode: F) -> Result<T, ProviderError>
    where
        T: Send + 'static,
        F: FnOnce(&[u8]) -> Result<T, ProviderError> + Send + 'static,
    {
        let body = self.download(url).await?.bytes().await?;
        tracing::debug!(%url, bytes = body.len(), "Download complete.");
        tokio::task::spawn_blocking(move || decode(&body)).await?
    }
}

/// Substitutes the season into a URL template.
pub fn season_url(template: &str, season: u16) -> String {
    template.replace(SEASON_PLACEHOLDER, &season.to_string())
}

#[async_trait]
impl DataProvider for NflverseClient {
    async fn schedules(&self, season: u16) -> Result<Arc<Vec<Game>>, ProviderError> {
        let url = season_url(&self.config.schedules_url, season);
        let games = self
            .fetch(&url, move |body| rows::parse_games(body, Some(season)))
            .await?;
        Ok(Arc::new(games))
    }

    async fn play_by_play(
        &self,
        season: u16,
        include_participation: bool,
    ) -> Result<Arc<Vec<Play>>, ProviderError> {
        let url = season_url(&self.config.play_by_play_url, season);
        let mut plays = self.fetch(&url, |body| rows::parse_plays(body)).await?;

        if include_participation {
            // Participation files trail the play-by-play release, so a missing
            // one leaves the plays without formations instead of failing them.
            let url = season_url(&self.config.participation_url, season);
            match self.fetch(&url, |body| rows::parse_participation(body)).await {
                Ok(participation) => rows::attach_participation(&mut plays, participation),
                Err(err) => {
                    tracing::warn!(%url, error = %err, "Participation unavailable.");
                }
            }
        }
        Ok(Arc::new(plays))
    }

    async fn weekly_stats(&self, season: u16) -> Result<Arc<Vec<WeeklyStatRow>>, ProviderError> {
        let url = season_url(&self.config.weekly_stats_url, season);
        let rows = self.fetch(&url, |body| rows::parse_weekly(body)).await?;
        // Some releases bundle several seasons (and postseason rows) in one file.
        Ok(Arc::new(rows.into_iter().filter(|r| r.season == season).collect()))
    }

    async fn team_descriptors(&self) -> Result<Arc<Vec<TeamDescriptor>>, ProviderError> {
        let teams = self
            .fetch(&self.config.teams_url, |body| rows::parse_teams(body))
            .await?;
        Ok(Arc::new(teams))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_url() {
        assert_eq!(
            season_url("https://example.com/pbp/play_by_play_{season}.csv", 2024),
            "https://example.com/pbp/play_by_play_2024.csv"
        );
        assert_eq!(
            season_url("https://example.com/games.csv", 2024),
            "https://example.com/games.csv"
        );
    }

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(NflverseClient::new(&ProviderConfig::default()).is_ok());
    }
}
