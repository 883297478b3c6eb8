use crate::error::ProviderError;
use crate::DataProvider;
use async_trait::async_trait;
use chrono::Local;
use core_types::{current_season, Game, Play, TeamDescriptor, WeeklyStatRow};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

struct Entry<T> {
    data: Arc<Vec<T>>,
    fetched_at: Instant,
}

/// One key's entry. Holding its lock across the fetch makes concurrent misses
/// on the same key wait for a single upstream download.
type Cell<T> = Arc<Mutex<Option<Entry<T>>>>;

type Slot<K, T> = RwLock<HashMap<K, Cell<T>>>;

/// Wraps a `DataProvider` with a process-lifetime, per-season cache.
///
/// Completed seasons never change, so they are kept until restart. The current
/// season gains rows as games are played and expires after `ttl`, as does the
/// team descriptor list. Empty responses are never cached. Concurrent misses
/// on one key share a single fetch; different keys fetch independently.
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    current_season: Option<u16>,
    schedules: Slot<u16, Game>,
    plays: Slot<(u16, bool), Play>,
    weekly: Slot<u16, WeeklyStatRow>,
    teams: Slot<(), TeamDescriptor>,
}

impl<P: DataProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            current_season: None,
            schedules: RwLock::default(),
            plays: RwLock::default(),
            weekly: RwLock::default(),
            teams: RwLock::default(),
        }
    }

    /// Pins the season treated as "current" instead of deriving it from today.
    pub fn with_current_season(mut self, season: u16) -> Self {
        self.current_season = Some(season);
        self
    }

    fn expires(&self, season: u16) -> bool {
        let current = self
            .current_season
            .unwrap_or_else(|| current_season(Local::now().date_naive()));
        season >= current
    }

    async fn cell<K, T>(slot: &Slot<K, T>, key: &K) -> Cell<T>
    where
        K: Eq + Hash + Clone,
    {
        if let Some(cell) = slot.read().await.get(key) {
            return cell.clone();
        }
        slot.write().await.entry(key.clone()).or_default().clone()
    }

    async fn cached<K, T, F, Fut>(
        &self,
        slot: &Slot<K, T>,
        key: K,
        expires: bool,
        fetch: F,
    ) -> Result<Arc<Vec<T>>, ProviderError>
    where
        K: Eq + Hash + Clone + Debug,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<Vec<T>>, ProviderError>>,
    {
        let cell = Self::cell(slot, &key).await;
        let mut entry = cell.lock().await;
        if let Some(cached) = entry.as_ref() {
            if !expires || cached.fetched_at.elapsed() < self.ttl {
                tracing::debug!(?key, "Dataset cache hit.");
                return Ok(cached.data.clone());
            }
        }

        tracing::debug!(?key, "Dataset cache miss.");
        let data = fetch().await?;
        if !data.is_empty() {
            *entry = Some(Entry {
                data: data.clone(),
                fetched_at: Instant::now(),
            });
        }
        Ok(data)
    }
}

#[async_trait]
impl<P: DataProvider> DataProvider for CachedProvider<P> {
    async fn schedules(&self, season: u16) -> Result<Arc<Vec<Game>>, ProviderError> {
        self.cached(&self.schedules, season, self.expires(season), || {
            self.inner.schedules(season)
        })
        .await
    }

    async fn play_by_play(
        &self,
        season: u16,
        include_participation: bool,
    ) -> Result<Arc<Vec<Play>>, ProviderError> {
        self.cached(
            &self.plays,
            (season, include_participation),
            self.expires(season),
            || self.inner.play_by_play(season, include_participation),
        )
        .await
    }

    async fn weekly_stats(&self, season: u16) -> Result<Arc<Vec<WeeklyStatRow>>, ProviderError> {
        self.cached(&self.weekly, season, self.expires(season), || {
            self.inner.weekly_stats(season)
        })
        .await
    }

    async fn team_descriptors(&self) -> Result<Arc<Vec<TeamDescriptor>>, ProviderError> {
        self.cached(&self.teams, (), true, || self.inner.team_descriptors())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticProvider;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often the wrapped provider is actually asked for schedules.
    struct CountingProvider {
        inner: StaticProvider,
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl DataProvider for CountingProvider {
        async fn schedules(&self, season: u16) -> Result<Arc<Vec<Game>>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.inner.schedules(season).await
        }
        async fn play_by_play(
            &self,
            season: u16,
            participation: bool,
        ) -> Result<Arc<Vec<Play>>, ProviderError> {
            self.inner.play_by_play(season, participation).await
        }
        async fn weekly_stats(
            &self,
            season: u16,
        ) -> Result<Arc<Vec<WeeklyStatRow>>, ProviderError> {
            self.inner.weekly_stats(season).await
        }
        async fn team_descriptors(&self) -> Result<Arc<Vec<TeamDescriptor>>, ProviderError> {
            self.inner.team_descriptors().await
        }
    }

    fn counting(seasons: &[u16]) -> CountingProvider {
        let games = seasons
            .iter()
            .map(|&season| Game {
                game_id: format!("{season}_01_BAL_KC"),
                season,
                week: 1,
                home_team: "KC".to_string(),
                away_team: "BAL".to_string(),
                gameday: NaiveDate::from_ymd_opt(i32::from(season), 9, 5).unwrap(),
            })
            .collect();
        CountingProvider {
            inner: StaticProvider::new().with_games(games),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_repeated_requests_hit_the_cache() {
        let cache = CachedProvider::new(counting(&[2024]), Duration::from_secs(300))
            .with_current_season(2024);
        let first = cache.schedules(2024).await.unwrap();
        let second = cache.schedules(2024).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_current_season_expires_but_past_seasons_do_not() {
        let cache = CachedProvider::new(counting(&[2023, 2024]), Duration::ZERO)
            .with_current_season(2024);

        cache.schedules(2023).await.unwrap();
        cache.schedules(2023).await.unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);

        cache.schedules(2024).await.unwrap();
        cache.schedules(2024).await.unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_results_are_not_cached() {
        let cache = CachedProvider::new(counting(&[]), Duration::from_secs(300))
            .with_current_season(2024);
        assert!(cache.schedules(2022).await.unwrap().is_empty());
        assert!(cache.schedules(2022).await.unwrap().is_empty());
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_cold_requests_share_one_fetch() {
        let provider = CountingProvider {
            delay: Duration::from_millis(50),
            ..counting(&[2023, 2024])
        };
        let cache = CachedProvider::new(provider, Duration::from_secs(300))
            .with_current_season(2024);

        let (a, b, c, d) = tokio::join!(
            cache.schedules(2023),
            cache.schedules(2023),
            cache.schedules(2023),
            cache.schedules(2023)
        );
        for games in [a, b, c, d] {
            assert_eq!(games.unwrap().len(), 1);
        }
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);

        // Another season is not held up by the first one's entry.
        cache.schedules(2024).await.unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }
}
