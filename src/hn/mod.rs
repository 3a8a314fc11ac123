// Hacker News API module.
// Clients, provider traits, and types for the item and search endpoints.

pub mod client;
pub mod search;
pub mod types;

pub use client::HnClient;
pub use search::AlgoliaClient;
pub use types::{DisplayRow, FeedKind, Item, RowKind, SearchHit, SearchResponse, plain_text};

use std::future::Future;

use crate::error::Result;

/// Story listing collaborator: ordered feed id lists and single items.
/// Implemented by the live HTTP client and by in-memory fakes in tests.
pub trait StoryProvider {
    fn feed_ids(&self, kind: FeedKind) -> impl Future<Output = Result<Vec<u64>>>;
    fn item(&self, id: u64) -> impl Future<Output = Result<Option<Item>>>;
}

/// Full-text search collaborator: one page of hits per call.
pub trait SearchProvider {
    fn search(&self, query: &str, page: u32) -> impl Future<Output = Result<SearchResponse>>;
}
