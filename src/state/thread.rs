// Comment thread assembly.
// Breadth-first traversal over the flat item graph, then recursive tree
// construction filtered through the displayability check.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};

use crate::error::{EmberError, Result};
use crate::hn::types::timestamp;
use crate::hn::{DisplayRow, Item, StoryProvider, plain_text};
use crate::services::Services;

use super::flatten::flatten;
use super::navigation::PaneCursor;

/// One displayable comment with its resolved children. Depth is assigned
/// during construction (story's direct replies = 0) and never changes.
#[derive(Debug, Clone)]
pub struct CommentNode {
    pub id: u64,
    pub author: String,
    pub text: String,
    pub time: DateTime<Utc>,
    pub depth: usize,
    pub parent: Option<u64>,
    pub children: Vec<CommentNode>,
}

/// Total descendants below a node (shown on collapsed rows).
pub fn descendant_count(node: &CommentNode) -> usize {
    node.children
        .iter()
        .map(|child| 1 + descendant_count(child))
        .sum()
}

/// Fetch every item reachable from the given root child ids and build the
/// nested comment structure.
///
/// The traversal is breadth-first with a visited set, so shared children
/// and malformed cycles are fetched exactly once; each step awaits a single
/// cache-through fetch. A failed fetch drops that subtree like a missing
/// item would; cache persistence failures propagate.
pub async fn assemble_thread<P: StoryProvider, S>(
    services: &mut Services<P, S>,
    root_kids: &[u64],
) -> Result<Vec<CommentNode>> {
    let mut queue: VecDeque<u64> = root_kids.iter().copied().collect();
    let mut visited: HashSet<u64> = HashSet::new();
    let mut lookup: HashMap<u64, Item> = HashMap::new();

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        let item = match services.item(id).await {
            Ok(item) => item,
            Err(err @ EmberError::CachePersist(_)) => return Err(err),
            Err(err) => {
                tracing::warn!(id, error = %err, "comment fetch failed, subtree dropped");
                None
            }
        };
        if let Some(item) = item {
            for kid in item.kids() {
                if !visited.contains(kid) {
                    queue.push_back(*kid);
                }
            }
            lookup.insert(id, item);
        }
    }

    Ok(build_nodes(&lookup, root_kids, 0))
}

/// Recursively build nodes from the lookup map. An id produces a node only
/// when its item is present and passes the displayability check; anything
/// else drops the whole subtree, even if descendants were fetched.
fn build_nodes(lookup: &HashMap<u64, Item>, ids: &[u64], depth: usize) -> Vec<CommentNode> {
    let mut nodes = Vec::new();
    for id in ids {
        let Some(item) = lookup.get(id) else {
            continue;
        };
        if !item.is_displayable_comment() {
            continue;
        }
        let Item::Comment(comment) = item else {
            continue;
        };
        nodes.push(CommentNode {
            id: comment.id,
            author: comment.by.clone().unwrap_or_default(),
            text: plain_text(comment.text.as_deref().unwrap_or_default()),
            time: timestamp(comment.time),
            depth,
            parent: comment.parent,
            children: build_nodes(lookup, &comment.kids, depth + 1),
        });
    }
    nodes
}

/// View state for the comments pane: the story header, the assembled tree,
/// and the collapse overlay. Rebuilt on every activation.
#[derive(Debug)]
pub struct CommentsPane {
    pub story: DisplayRow,
    pub nodes: Vec<CommentNode>,
    pub collapsed: HashSet<u64>,
    pub cursor: PaneCursor,
}

impl CommentsPane {
    pub fn new(story: DisplayRow, nodes: Vec<CommentNode>) -> Self {
        let mut pane = Self {
            story,
            nodes,
            collapsed: HashSet::new(),
            cursor: PaneCursor::default(),
        };
        let len = pane.visible_len();
        pane.cursor.sync(len);
        pane
    }

    /// Rows currently visible after applying the collapse set.
    pub fn visible(&self) -> Vec<&CommentNode> {
        flatten(&self.nodes, &self.collapsed)
    }

    pub fn visible_len(&self) -> usize {
        self.visible().len()
    }

    /// Toggle collapse of the subtree under the cursor.
    pub fn toggle_selected(&mut self) {
        let id = match self.visible().get(self.cursor.index()) {
            Some(node) => node.id,
            None => return,
        };
        if !self.collapsed.remove(&id) {
            self.collapsed.insert(id);
        }
        let len = self.visible_len();
        self.cursor.sync(len);
    }
}
