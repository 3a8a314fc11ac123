// State management module.
// Pane navigation, story materialization, thread assembly, and search.

pub mod flatten;
pub mod navigation;
pub mod search;
pub mod stories;
pub mod thread;

pub use flatten::flatten;
pub use navigation::{InputMode, JumpGesture, Pane, PaneCursor};
pub use search::{MatchList, SearchPane, local_matches};
pub use stories::StoryFeed;
pub use thread::{CommentNode, CommentsPane, assemble_thread, descendant_count};
