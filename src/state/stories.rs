// Story feed materialization.
// Turns a feed's id list into display rows incrementally, one ordered batch
// at a time, fetching cache misses concurrently.

use std::collections::HashMap;

use futures_util::future::join_all;

use crate::error::Result;
use crate::hn::{DisplayRow, FeedKind, Item, StoryProvider};
use crate::services::Services;

use super::navigation::PaneCursor;

/// Loaded state for the feed pane: the full id list, the rows materialized
/// so far, and how many ids have been consumed (including excluded ones).
#[derive(Debug, Default)]
pub struct StoryFeed {
    pub kind: FeedKind,
    pub ids: Vec<u64>,
    pub rows: Vec<DisplayRow>,
    pub consumed: usize,
    pub cursor: PaneCursor,
}

impl StoryFeed {
    pub fn has_more(&self) -> bool {
        self.consumed < self.ids.len()
    }

    /// Replace the id list with `kind`'s and materialize the first batch.
    pub async fn reload<P: StoryProvider, S>(
        &mut self,
        services: &mut Services<P, S>,
        kind: FeedKind,
        batch: usize,
    ) -> Result<()> {
        self.kind = kind;
        self.ids = services.feed_ids(kind).await?;
        self.rows.clear();
        self.consumed = 0;
        self.cursor = PaneCursor::default();
        self.load_next_batch(services, batch).await?;
        Ok(())
    }

    /// Materialize the next `batch` unconsumed ids into rows, preserving the
    /// id order. Cache hits are reused; misses are fetched concurrently
    /// (bounded by the batch size). A failed individual fetch excludes that
    /// id instead of aborting its siblings; cache write failures propagate
    /// after the successful rows have been appended.
    pub async fn load_next_batch<P: StoryProvider, S>(
        &mut self,
        services: &mut Services<P, S>,
        batch: usize,
    ) -> Result<usize> {
        let slice: Vec<u64> = self
            .ids
            .iter()
            .skip(self.consumed)
            .take(batch)
            .copied()
            .collect();
        if slice.is_empty() {
            return Ok(0);
        }

        let mut resolved: HashMap<u64, Item> = HashMap::new();
        let mut misses: Vec<u64> = Vec::new();
        for id in &slice {
            match services.cached_item(*id)? {
                Some(item) => {
                    resolved.insert(*id, item);
                }
                None => misses.push(*id),
            }
        }

        let fetched = join_all(misses.iter().map(|id| services.provider.item(*id))).await;
        let mut to_cache: Vec<Item> = Vec::new();
        for (id, result) in misses.iter().zip(fetched) {
            match result {
                Ok(Some(item)) => {
                    to_cache.push(item.clone());
                    resolved.insert(*id, item);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(id = *id, error = %err, "story fetch failed, row excluded");
                }
            }
        }

        let before = self.rows.len();
        for id in &slice {
            if let Some(row) = resolved.get(id).and_then(DisplayRow::from_item) {
                self.rows.push(row);
            }
        }
        self.consumed += slice.len();
        self.cursor.sync(self.rows.len());

        let appended = self.rows.len() - before;
        tracing::debug!(
            appended,
            consumed = self.consumed,
            total = self.ids.len(),
            "feed batch materialized"
        );

        for item in &to_cache {
            services.cache_item(item)?;
        }
        Ok(appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::config::TtlConfig;
    use crate::services::test_support::{FakeProvider, FakeSearch, comment, story};
    use tempfile::TempDir;

    fn services_with_cache(
        provider: FakeProvider,
        dir: &TempDir,
    ) -> Services<FakeProvider, FakeSearch> {
        Services::new(
            provider,
            FakeSearch::default(),
            CacheStore::new(dir.path().join("cache.json")),
            TtlConfig::default(),
        )
    }

    fn dead_story(id: u64) -> crate::hn::Item {
        match story(id, "dead", &[]) {
            crate::hn::Item::Story(mut inner) => {
                inner.dead = true;
                crate::hn::Item::Story(inner)
            }
            other => other,
        }
    }

    #[tokio::test]
    async fn test_rows_preserve_id_order_and_filter_kinds() {
        let dir = TempDir::new().unwrap();
        let mut provider = FakeProvider::with_items(vec![
            story(1, "first", &[]),
            comment(2, 1, "not a row", &[]),
            dead_story(3),
            story(4, "second", &[]),
        ]);
        provider.feeds.insert(FeedKind::Top, vec![1, 2, 3, 4, 5]);
        let mut services = services_with_cache(provider, &dir);

        let mut feed = StoryFeed::default();
        feed.reload(&mut services, FeedKind::Top, 10).await.unwrap();

        // Comment, dead story, and the absent id 5 are excluded silently.
        let ids: Vec<u64> = feed.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(feed.consumed, 5);
        assert!(!feed.has_more());
    }

    #[tokio::test]
    async fn test_batches_consume_ids_incrementally() {
        let dir = TempDir::new().unwrap();
        let mut provider = FakeProvider::with_items(vec![
            story(1, "a", &[]),
            story(2, "b", &[]),
            story(3, "c", &[]),
        ]);
        provider.feeds.insert(FeedKind::New, vec![1, 2, 3]);
        let mut services = services_with_cache(provider, &dir);

        let mut feed = StoryFeed::default();
        feed.reload(&mut services, FeedKind::New, 2).await.unwrap();
        assert_eq!(feed.rows.len(), 2);
        assert_eq!(feed.consumed, 2);
        assert!(feed.has_more());

        let appended = feed.load_next_batch(&mut services, 2).await.unwrap();
        assert_eq!(appended, 1);
        assert_eq!(feed.consumed, 3);
        assert!(!feed.has_more());
    }

    #[tokio::test]
    async fn test_failed_fetch_excludes_only_that_id() {
        let dir = TempDir::new().unwrap();
        let mut provider = FakeProvider::with_items(vec![
            story(1, "a", &[]),
            story(2, "b", &[]),
            story(3, "c", &[]),
        ]);
        provider.feeds.insert(FeedKind::Top, vec![1, 2, 3]);
        provider.failing.insert(2);
        let mut services = services_with_cache(provider, &dir);

        let mut feed = StoryFeed::default();
        feed.reload(&mut services, FeedKind::Top, 3).await.unwrap();

        let ids: Vec<u64> = feed.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(feed.consumed, 3);
    }

    #[tokio::test]
    async fn test_cached_items_are_not_refetched() {
        let dir = TempDir::new().unwrap();
        let mut provider = FakeProvider::with_items(vec![story(1, "a", &[])]);
        provider.feeds.insert(FeedKind::Top, vec![1]);
        let mut services = services_with_cache(provider, &dir);

        let mut feed = StoryFeed::default();
        feed.reload(&mut services, FeedKind::Top, 5).await.unwrap();
        feed.reload(&mut services, FeedKind::Top, 5).await.unwrap();

        assert_eq!(services.provider.fetches(1), 1);
    }
}
