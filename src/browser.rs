// Browser collaborator.
// Opens a story in the OS default URL handler.

use crate::error::Result;
use crate::hn::DisplayRow;

/// Open the row's article URL, or its discussion page when it has none.
pub fn open_row(row: &DisplayRow) -> Result<()> {
    let url = row.url.clone().unwrap_or_else(|| row.discussion_url());
    tracing::debug!(url, "opening in browser");
    open::that(&url)?;
    Ok(())
}
