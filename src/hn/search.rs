// Full-text search API client.
// Queries the Algolia-backed search endpoint one page at a time.

use std::time::Duration;

use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{EmberError, Result};

use super::SearchProvider;
use super::client::check_response;
use super::types::SearchResponse;

const SEARCH_API_BASE: &str = "https://hn.algolia.com/api/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// HTTP client for the search API.
pub struct AlgoliaClient {
    client: Client,
    base_url: String,
}

impl AlgoliaClient {
    /// Create a client against the public search API.
    pub fn new() -> Result<Self> {
        Self::with_base(SEARCH_API_BASE)
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
}

impl SearchProvider for AlgoliaClient {
    /// Fetch one page of story hits for a query.
    async fn search(&self, query: &str, page: u32) -> Result<SearchResponse> {
        let url = format!("{}/search", self.base_url);
        let page = page.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("page", page.as_str()),
                ("tags", "story"),
            ])
            .send()
            .await
            .map_err(EmberError::Api)?;

        let response = check_response(response)?;
        let found: SearchResponse = response.json().await?;
        Ok(found)
    }
}
