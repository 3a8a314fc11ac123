// Navigation primitives for the pane state machine.
// Panes, input modes, clamped cursors, and the double-press jump gesture.

use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

/// The mutually exclusive top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Feed,
    Search,
    Comments,
}

/// Text-entry modes layered over the active pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    None,
    LocalSearch,
    GlobalSearch,
}

/// Cursor over a pane's row list, clamped to `[0, len - 1]`.
/// Wraps the ratatui list state so rendering keeps its scroll offset.
#[derive(Debug, Clone, Default)]
pub struct PaneCursor {
    pub list_state: ListState,
}

impl PaneCursor {
    pub fn index(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    /// Re-clamp after the list length changed (selects row 0 on first use).
    pub fn sync(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let index = self.index().min(len - 1);
        self.list_state.select(Some(index));
    }

    pub fn move_up(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let index = self.index().saturating_sub(1).min(len - 1);
        self.list_state.select(Some(index));
    }

    pub fn move_down(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let index = (self.index() + 1).min(len - 1);
        self.list_state.select(Some(index));
    }

    pub fn jump_top(&mut self, len: usize) {
        if len > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn jump_bottom(&mut self, len: usize) {
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    pub fn set(&mut self, index: usize, len: usize) {
        if len > 0 {
            self.list_state.select(Some(index.min(len - 1)));
        }
    }

    /// True when the cursor is within `threshold` rows of the end
    /// (pagination trigger).
    pub fn near_end(&self, len: usize, threshold: usize) -> bool {
        len > 0 && self.index() >= len.saturating_sub(threshold)
    }
}

/// Explicit two-state machine for the `gg` jump-to-top gesture: the second
/// press of the key must land before the deadline, otherwise the press
/// starts a new gesture.
#[derive(Debug, Clone, Copy, Default)]
pub enum JumpGesture {
    #[default]
    Idle,
    AwaitingSecond {
        deadline: Instant,
    },
}

impl JumpGesture {
    pub const WINDOW: Duration = Duration::from_millis(500);

    /// Record a press at `now`; returns true when it completes the gesture.
    pub fn press(&mut self, now: Instant) -> bool {
        match *self {
            JumpGesture::AwaitingSecond { deadline } if now <= deadline => {
                *self = JumpGesture::Idle;
                true
            }
            _ => {
                *self = JumpGesture::AwaitingSecond {
                    deadline: now + Self::WINDOW,
                };
                false
            }
        }
    }

    /// Any other key interrupts a pending gesture.
    pub fn reset(&mut self) {
        *self = JumpGesture::Idle;
    }
}
