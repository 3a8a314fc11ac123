// Hacker News item API client.
// Fetches feed id listings and single items from the Firebase-style endpoint.

use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{EmberError, Result};

use super::StoryProvider;
use super::types::{FeedKind, Item};

const HN_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// HTTP client for the item API.
pub struct HnClient {
    client: Client,
    base_url: String,
}

impl HnClient {
    /// Create a client against the public API.
    pub fn new() -> Result<Self> {
        Self::with_base(HN_API_BASE)
    }

    /// Create a client against an alternate base URL.
    pub fn with_base(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("ember-tui"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(EmberError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await.map_err(EmberError::Api)?;
        check_response(response)
    }
}

impl StoryProvider for HnClient {
    /// Fetch the ordered id list for a feed.
    async fn feed_ids(&self, kind: FeedKind) -> Result<Vec<u64>> {
        let response = self.get(&format!("/{}.json", kind.as_str())).await?;
        let ids: Vec<u64> = response.json().await?;
        Ok(ids)
    }

    /// Fetch a single item. The API answers `null` for unknown ids; a body
    /// that does not parse as an item is also treated as absent.
    async fn item(&self, id: u64) -> Result<Option<Item>> {
        let response = self.get(&format!("/item/{}.json", id)).await?;
        let body = response.text().await?;
        match serde_json::from_str::<Option<Item>>(&body) {
            Ok(item) => Ok(item),
            Err(err) => {
                tracing::debug!(id, error = %err, "unparseable item treated as absent");
                Ok(None)
            }
        }
    }
}

/// Map non-success statuses to an error carrying the status and URL.
pub(crate) fn check_response(response: Response) -> Result<Response> {
    match response.status() {
        StatusCode::OK => Ok(response),
        status => Err(EmberError::Http {
            status,
            url: response.url().to_string(),
        }),
    }
}
