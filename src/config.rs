// Startup configuration document.
// Loaded once from the platform config directory; missing fields fall back
// to their defaults, a corrupt document degrades to the defaults entirely.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::hn::FeedKind;

/// Per-resource cache lifetimes, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
    pub feed_secs: u64,
    pub item_secs: u64,
    pub search_secs: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            feed_secs: 600,
            item_secs: 3600,
            search_secs: 600,
        }
    }
}

impl TtlConfig {
    pub fn feed(&self) -> Duration {
        Duration::from_secs(self.feed_secs)
    }

    pub fn item(&self) -> Duration {
        Duration::from_secs(self.item_secs)
    }

    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search_secs)
    }
}

/// User configuration: default feed, batch size, and cache lifetimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedKind,
    pub batch_size: usize,
    pub ttl: TtlConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedKind::Top,
            batch_size: 20,
            ttl: TtlConfig::default(),
        }
    }
}

impl Config {
    /// Read the config document, applying defaults for anything missing.
    pub fn load(path: Option<&Path>) -> Config {
        let Some(path) = path else {
            return Config::default();
        };
        if !path.exists() {
            return Config::default();
        }
        let parsed = std::fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|contents| serde_json::from_str(&contents).map_err(|err| err.to_string()));
        let mut config: Config = match parsed {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "unusable config document, using defaults");
                Config::default()
            }
        };
        config.batch_size = config.batch_size.max(1);
        config
    }
}
