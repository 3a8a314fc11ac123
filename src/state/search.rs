// Local and remote search.
// Local search is a stable, case-insensitive substring filter over the
// already-loaded rows; remote search loads one cached page at a time.

use crate::error::Result;
use crate::hn::{DisplayRow, SearchProvider};
use crate::services::Services;

use super::navigation::PaneCursor;

/// Indices of rows whose title contains `query` (case-insensitive),
/// original list order preserved.
pub fn local_matches(rows: &[DisplayRow], query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.title.to_lowercase().contains(&needle))
        .map(|(index, _)| index)
        .collect()
}

/// Positions of local-search matches plus the one currently focused.
#[derive(Debug, Clone, Default)]
pub struct MatchList {
    pub indices: Vec<usize>,
    pub current: usize,
}

impl MatchList {
    pub fn new(indices: Vec<usize>) -> Self {
        Self {
            indices,
            current: 0,
        }
    }

    pub fn clear(&mut self) {
        self.indices.clear();
        self.current = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Row index of the focused match.
    pub fn focused(&self) -> Option<usize> {
        self.indices.get(self.current).copied()
    }

    /// Advance to the next match, wrapping around.
    pub fn next(&mut self) -> Option<usize> {
        if self.indices.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.indices.len();
        self.focused()
    }

    /// Step back to the previous match, wrapping around.
    pub fn prev(&mut self) -> Option<usize> {
        if self.indices.is_empty() {
            return None;
        }
        self.current = (self.current + self.indices.len() - 1) % self.indices.len();
        self.focused()
    }
}

/// Loaded state for the remote search pane.
#[derive(Debug, Default)]
pub struct SearchPane {
    pub query: String,
    pub page: u32,
    pub total_pages: u32,
    pub rows: Vec<DisplayRow>,
    pub cursor: PaneCursor,
}

impl SearchPane {
    /// Run the remote search for one page and replace the pane contents.
    /// Hits with malformed identifiers are dropped during the mapping.
    pub async fn run<P, S: SearchProvider>(
        &mut self,
        services: &mut Services<P, S>,
        query: &str,
        page: u32,
    ) -> Result<()> {
        let found = services.search_page(query, page).await?;
        self.query = query.to_string();
        self.page = found.page;
        self.total_pages = found.total_pages;
        self.rows = found.hits.iter().filter_map(DisplayRow::from_hit).collect();
        self.cursor = PaneCursor::default();
        self.cursor.sync(self.rows.len());
        Ok(())
    }

    pub fn has_next_page(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 0
    }
}
