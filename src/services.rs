// Dependency-injected data services.
// Combines the remote providers with the cache store so every data access
// path is cache-through with its resource's TTL.

use crate::cache::CacheStore;
use crate::config::TtlConfig;
use crate::error::Result;
use crate::hn::{FeedKind, Item, SearchProvider, SearchResponse, StoryProvider};

/// All remote and persisted data access, constructed once in `main` and
/// handed to the state machine.
pub struct Services<P, S> {
    pub provider: P,
    pub search: S,
    pub cache: CacheStore,
    ttl: TtlConfig,
}

impl<P, S> Services<P, S> {
    pub fn new(provider: P, search: S, cache: CacheStore, ttl: TtlConfig) -> Self {
        Self {
            provider,
            search,
            cache,
            ttl,
        }
    }

    fn item_key(id: u64) -> String {
        format!("item:{id}")
    }

    /// Cache-side lookup of a single item without touching the network.
    pub fn cached_item(&mut self, id: u64) -> Result<Option<Item>> {
        self.cache.get_as(&Self::item_key(id))
    }

    /// Write a fetched item through to the cache.
    pub fn cache_item(&mut self, item: &Item) -> Result<()> {
        self.cache
            .set_as(&Self::item_key(item.id()), item, self.ttl.item())
    }
}

impl<P: StoryProvider, S> Services<P, S> {
    /// The ordered id list for a feed, cache-through.
    pub async fn feed_ids(&mut self, kind: FeedKind) -> Result<Vec<u64>> {
        let key = format!("feed:{}", kind.as_str());
        if let Some(ids) = self.cache.get_as(&key)? {
            return Ok(ids);
        }
        let ids = self.provider.feed_ids(kind).await?;
        self.cache.set_as(&key, &ids, self.ttl.feed())?;
        Ok(ids)
    }

    /// A single item, cache-through. Absence is not cached.
    pub async fn item(&mut self, id: u64) -> Result<Option<Item>> {
        if let Some(item) = self.cached_item(id)? {
            return Ok(Some(item));
        }
        match self.provider.item(id).await? {
            Some(item) => {
                self.cache_item(&item)?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }
}

impl<P, S: SearchProvider> Services<P, S> {
    /// One page of remote search results, cache-through keyed by query+page.
    pub async fn search_page(&mut self, query: &str, page: u32) -> Result<SearchResponse> {
        let key = format!("search:{query}:{page}");
        if let Some(found) = self.cache.get_as(&key)? {
            return Ok(found);
        }
        let found = self.search.search(query, page).await?;
        self.cache.set_as(&key, &found, self.ttl.search())?;
        Ok(found)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{FakeProvider, FakeSearch, story};
    use super::*;
    use crate::cache::CacheStore;
    use tempfile::TempDir;

    fn services_in(dir: &TempDir, provider: FakeProvider) -> Services<FakeProvider, FakeSearch> {
        Services::new(
            provider,
            FakeSearch::default(),
            CacheStore::new(dir.path().join("cache.json")),
            TtlConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_item_is_fetched_once_then_served_from_cache() {
        let dir = TempDir::new().unwrap();
        let provider = FakeProvider::with_items(vec![story(1, "hello", &[])]);
        let mut services = services_in(&dir, provider);

        assert!(services.item(1).await.unwrap().is_some());
        assert!(services.item(1).await.unwrap().is_some());
        assert_eq!(services.provider.fetches(1), 1);
    }

    #[tokio::test]
    async fn test_feed_ids_cache_through() {
        let dir = TempDir::new().unwrap();
        let mut provider = FakeProvider::default();
        provider.feeds.insert(FeedKind::Top, vec![3, 1, 2]);
        let mut services = services_in(&dir, provider);

        assert_eq!(services.feed_ids(FeedKind::Top).await.unwrap(), vec![3, 1, 2]);
        // Second call is answered by the cache even if the provider changes.
        services.provider.feeds.insert(FeedKind::Top, vec![9]);
        assert_eq!(services.feed_ids(FeedKind::Top).await.unwrap(), vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_absent_item_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let mut services = services_in(&dir, FakeProvider::default());

        assert!(services.item(404).await.unwrap().is_none());
        assert!(services.item(404).await.unwrap().is_none());
        assert_eq!(services.provider.fetches(404), 2);
    }
}
