use async_trait::async_trait;
use configuration::ProviderConfig;
use core_types::{Game, Play, TeamDescriptor, WeeklyStatRow};
use std::sync::Arc;
use std::time::Duration;

pub mod cache;
pub mod error;
pub mod memory;
pub mod nflverse;
pub mod rows;

// --- Public API ---
pub use cache::CachedProvider;
pub use error::ProviderError;
pub use memory::StaticProvider;
pub use nflverse::NflverseClient;

/// The abstract interface to the upstream football data source.
///
/// This trait is the contract the orchestrator is written against, allowing
/// the underlying implementation (HTTP, local files, cache, test fixture) to be
/// swapped out. Every operation may fail and may legitimately return an empty
/// dataset; deciding what an empty dataset means is the caller's job.
///
/// Datasets are returned behind an `Arc` so a cached season can be handed to
/// many concurrent requests without copying it.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// All scheduled games of one season, played or not.
    async fn schedules(&self, season: u16) -> Result<Arc<Vec<Game>>, ProviderError>;

    /// Every play of one season. Formation and personnel columns are joined on
    /// when `include_participation` is set.
    async fn play_by_play(
        &self,
        season: u16,
        include_participation: bool,
    ) -> Result<Arc<Vec<Play>>, ProviderError>;

    /// Per-player, per-week box scores of one season.
    async fn weekly_stats(&self, season: u16) -> Result<Arc<Vec<WeeklyStatRow>>, ProviderError>;

    /// Static descriptors for every franchise.
    async fn team_descriptors(&self) -> Result<Arc<Vec<TeamDescriptor>>, ProviderError>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Arc<P> {
    async fn schedules(&self, season: u16) -> Result<Arc<Vec<Game>>, ProviderError> {
        (**self).schedules(season).await
    }

    async fn play_by_play(
        &self,
        season: u16,
        include_participation: bool,
    ) -> Result<Arc<Vec<Play>>, ProviderError> {
        (**self).play_by_play(season, include_participation).await
    }

    async fn weekly_stats(&self, season: u16) -> Result<Arc<Vec<WeeklyStatRow>>, ProviderError> {
        (**self).weekly_stats(season).await
    }

    async fn team_descriptors(&self) -> Result<Arc<Vec<TeamDescriptor>>, ProviderError> {
        (**self).team_descriptors().await
    }
}

/// Builds the provider the configuration asks for.
///
/// With `data_dir` set, `season` is loaded from local files once and served
/// from memory. Otherwise the nflverse releases are downloaded on demand and
/// kept in the per-season cache.
pub fn from_config(
    config: &ProviderConfig,
    season: u16,
) -> Result<Arc<dyn DataProvider>, ProviderError> {
    match &config.data_dir {
        Some(dir) => Ok(Arc::new(StaticProvider::load_dir(dir, season)?)),
        None => {
            let client = NflverseClient::new(config)?;
            let ttl = Duration::from_secs(config.cache_ttl_secs);
            tracing::info!(ttl_secs = config.cache_ttl_secs, "Using nflverse provider.");
            Ok(Arc::new(CachedProvider::new(client, ttl)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_config_loads_local_data_dir() {
        let config = ProviderConfig {
            data_dir: Some(PathBuf::from("/definitely/not/here")),
            ..Default::default()
        };
        let err = from_config(&config, 2024).err().unwrap();
        assert!(matches!(err, ProviderError::Io { .. }));
    }

    #[test]
    fn test_from_config_defaults_to_cached_nflverse() {
        assert!(from_config(&ProviderConfig::default(), 2024).is_ok());
    }
}
