// App state and main event loop.
// Owns pane navigation, input modes, cursors, and the return stack, and
// dispatches every input event. All async work is awaited inline on the
// one cooperative task, so state mutation is never concurrent.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::prelude::*;

use crate::browser;
use crate::config::Config;
use crate::error::{EmberError, Result};
use crate::hn::{DisplayRow, FeedKind, SearchProvider, StoryProvider};
use crate::services::Services;
use crate::state::{
    CommentsPane, InputMode, JumpGesture, MatchList, Pane, SearchPane, StoryFeed, assemble_thread,
    local_matches,
};
use crate::ui;

/// Rows from the end of the feed at which the next batch is prefetched.
const PREFETCH_THRESHOLD: usize = 5;

/// Main application state. Exactly one pane is active at a time; each pane
/// keeps its own cursor, which survives pane switches within the session.
pub struct App<P, S> {
    pub services: Services<P, S>,
    pub config: Config,
    pub pane: Pane,
    pub feed: StoryFeed,
    pub search: SearchPane,
    pub comments: Option<CommentsPane>,
    return_stack: Vec<Pane>,
    pub input: InputMode,
    pub buffer: String,
    pub matches: MatchList,
    pub status: Option<String>,
    pub loading: bool,
    gesture: JumpGesture,
    should_quit: bool,
}

impl<P: StoryProvider, S: SearchProvider> App<P, S> {
    pub fn new(services: Services<P, S>, config: Config) -> Self {
        Self {
            services,
            config,
            pane: Pane::Feed,
            feed: StoryFeed::default(),
            search: SearchPane::default(),
            comments: None,
            return_stack: Vec::new(),
            input: InputMode::None,
            buffer: String::new(),
            matches: MatchList::default(),
            status: None,
            loading: false,
            gesture: JumpGesture::default(),
            should_quit: false,
        }
    }

    /// Main event loop. Startup either runs the `--search` query or loads
    /// the configured feed.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<impl Backend>,
        initial_search: Option<String>,
    ) -> Result<()> {
        match initial_search {
            Some(query) => self.commit_global_search(query).await,
            None => self.reload_feed(self.config.feed).await,
        }
        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events().await?;
        }
        Ok(())
    }

    /// Poll for the next input event. Only terminal failures propagate;
    /// everything triggered by a key is handled (and reported) internally.
    async fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key).await;
                }
            }
        }
        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        self.status = None;
        match self.input {
            InputMode::None => self.handle_normal_key(key).await,
            InputMode::LocalSearch | InputMode::GlobalSearch => self.handle_entry_key(key).await,
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) {
        if !matches!(key.code, KeyCode::Char('g')) {
            self.gesture.reset();
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => self.go_back(),
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1).await,
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1).await,
            KeyCode::Char('g') => {
                if self.gesture.press(Instant::now()) {
                    self.jump_top();
                }
            }
            KeyCode::Char('G') => {
                self.jump_bottom();
                self.maybe_prefetch().await;
            }
            KeyCode::Enter | KeyCode::Char('c') => self.open_comments().await,
            KeyCode::Char('o') => self.open_in_browser(),
            KeyCode::Char('/') => self.begin_entry(InputMode::LocalSearch),
            KeyCode::Char('s') => self.begin_entry(InputMode::GlobalSearch),
            KeyCode::Char('n') => self.focus_match(true),
            KeyCode::Char('N') => self.focus_match(false),
            KeyCode::Char(' ') => self.toggle_collapse(),
            KeyCode::Char(']') => self.search_page_step(1).await,
            KeyCode::Char('[') => self.search_page_step(-1).await,
            KeyCode::Char('r') => self.refresh().await,
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let kind = c
                    .to_digit(10)
                    .and_then(|digit| (digit as usize).checked_sub(1))
                    .and_then(|slot| FeedKind::ALL.get(slot).copied());
                if let Some(kind) = kind {
                    self.return_stack.clear();
                    self.comments = None;
                    self.pane = Pane::Feed;
                    self.reload_feed(kind).await;
                }
            }
            _ => {}
        }
    }

    /// Text entry for the search input modes: printable keys append,
    /// backspace removes, escape cancels, enter commits.
    async fn handle_entry_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input = InputMode::None;
                self.buffer.clear();
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Enter => self.commit_entry().await,
            KeyCode::Char(c) => self.buffer.push(c),
            _ => {}
        }
    }

    async fn commit_entry(&mut self) {
        let query = self.buffer.trim().to_string();
        let mode = self.input;
        self.input = InputMode::None;
        self.buffer.clear();
        if query.is_empty() {
            self.status = Some("empty search query ignored".to_string());
            return;
        }
        match mode {
            InputMode::LocalSearch => self.commit_local_search(&query),
            InputMode::GlobalSearch => self.commit_global_search(query).await,
            InputMode::None => {}
        }
    }

    /// Pop the return stack; fall back to feed from search; quit from feed.
    fn go_back(&mut self) {
        if self.pane == Pane::Comments {
            // The thread is rebuilt on the next activation.
            self.comments = None;
        }
        match self.return_stack.pop() {
            Some(pane) => self.pane = pane,
            None => match self.pane {
                Pane::Feed => self.should_quit = true,
                Pane::Search | Pane::Comments => self.pane = Pane::Feed,
            },
        }
        self.matches.clear();
    }

    async fn move_cursor(&mut self, delta: i64) {
        match self.pane {
            Pane::Feed => {
                let len = self.feed.rows.len();
                if delta > 0 {
                    self.feed.cursor.move_down(len);
                } else {
                    self.feed.cursor.move_up(len);
                }
                self.maybe_prefetch().await;
            }
            Pane::Search => {
                let len = self.search.rows.len();
                if delta > 0 {
                    self.search.cursor.move_down(len);
                } else {
                    self.search.cursor.move_up(len);
                }
            }
            Pane::Comments => {
                if let Some(comments) = self.comments.as_mut() {
                    let len = comments.visible_len();
                    if delta > 0 {
                        comments.cursor.move_down(len);
                    } else {
                        comments.cursor.move_up(len);
                    }
                }
            }
        }
    }

    fn jump_top(&mut self) {
        match self.pane {
            Pane::Feed => self.feed.cursor.jump_top(self.feed.rows.len()),
            Pane::Search => self.search.cursor.jump_top(self.search.rows.len()),
            Pane::Comments => {
                if let Some(comments) = self.comments.as_mut() {
                    let len = comments.visible_len();
                    comments.cursor.jump_top(len);
                }
            }
        }
    }

    fn jump_bottom(&mut self) {
        match self.pane {
            Pane::Feed => self.feed.cursor.jump_bottom(self.feed.rows.len()),
            Pane::Search => self.search.cursor.jump_bottom(self.search.rows.len()),
            Pane::Comments => {
                if let Some(comments) = self.comments.as_mut() {
                    let len = comments.visible_len();
                    comments.cursor.jump_bottom(len);
                }
            }
        }
    }

    /// Prefetch the next feed batch when the cursor nears the end of the
    /// loaded rows, gated by the loading flag.
    async fn maybe_prefetch(&mut self) {
        if self.pane != Pane::Feed || self.loading || !self.feed.has_more() {
            return;
        }
        if !self
            .feed
            .cursor
            .near_end(self.feed.rows.len(), PREFETCH_THRESHOLD)
        {
            return;
        }
        self.loading = true;
        let result = self
            .feed
            .load_next_batch(&mut self.services, self.config.batch_size)
            .await;
        self.loading = false;
        if let Err(err) = result {
            self.report(err);
        }
    }

    async fn reload_feed(&mut self, kind: FeedKind) {
        if self.loading {
            return;
        }
        self.loading = true;
        let result = self
            .feed
            .reload(&mut self.services, kind, self.config.batch_size)
            .await;
        self.loading = false;
        match result {
            Ok(()) => self.matches.clear(),
            Err(err) => self.report(err),
        }
    }

    /// Open the comment thread for the selected row, remembering the pane
    /// we came from on the return stack.
    async fn open_comments(&mut self) {
        let row = match self.pane {
            Pane::Feed => self.feed.rows.get(self.feed.cursor.index()).cloned(),
            Pane::Search => self.search.rows.get(self.search.cursor.index()).cloned(),
            Pane::Comments => None,
        };
        let Some(row) = row else {
            return;
        };
        if self.loading {
            return;
        }
        self.loading = true;
        let result = self.load_thread(&row).await;
        self.loading = false;
        match result {
            Ok(comments) => {
                self.return_stack.push(self.pane);
                self.comments = Some(comments);
                self.pane = Pane::Comments;
                self.matches.clear();
            }
            Err(err) => self.report(err),
        }
    }

    async fn load_thread(&mut self, row: &DisplayRow) -> Result<CommentsPane> {
        let kids: Vec<u64> = match self.services.item(row.id).await? {
            Some(item) => item.kids().to_vec(),
            None => Vec::new(),
        };
        let nodes = assemble_thread(&mut self.services, &kids).await?;
        Ok(CommentsPane::new(row.clone(), nodes))
    }

    fn open_in_browser(&mut self) {
        let row = match self.pane {
            Pane::Feed => self.feed.rows.get(self.feed.cursor.index()).cloned(),
            Pane::Search => self.search.rows.get(self.search.cursor.index()).cloned(),
            Pane::Comments => self.comments.as_ref().map(|c| c.story.clone()),
        };
        let Some(row) = row else {
            return;
        };
        if let Err(err) = browser::open_row(&row) {
            self.report(err);
        }
    }

    fn begin_entry(&mut self, mode: InputMode) {
        if mode == InputMode::LocalSearch && self.pane == Pane::Comments {
            self.status = Some("local search filters story lists".to_string());
            return;
        }
        self.input = mode;
        self.buffer.clear();
    }

    /// Filter the active list's titles and focus the first match.
    fn commit_local_search(&mut self, query: &str) {
        let rows = match self.pane {
            Pane::Feed => &self.feed.rows,
            Pane::Search => &self.search.rows,
            Pane::Comments => return,
        };
        let indices = local_matches(rows, query);
        if indices.is_empty() {
            self.matches.clear();
            self.status = Some(format!("no matches for '{query}'"));
            return;
        }
        self.status = Some(format!("{} matches for '{query}'", indices.len()));
        self.matches = MatchList::new(indices);
        self.focus_current_match();
    }

    fn focus_current_match(&mut self) {
        let Some(row) = self.matches.focused() else {
            return;
        };
        match self.pane {
            Pane::Feed => self.feed.cursor.set(row, self.feed.rows.len()),
            Pane::Search => self.search.cursor.set(row, self.search.rows.len()),
            Pane::Comments => {}
        }
    }

    fn focus_match(&mut self, forward: bool) {
        let moved = if forward {
            self.matches.next()
        } else {
            self.matches.prev()
        };
        if moved.is_some() {
            self.focus_current_match();
            self.status = Some(format!(
                "match {}/{}",
                self.matches.current + 1,
                self.matches.len()
            ));
        }
    }

    /// Run the remote search and switch to the search pane.
    async fn commit_global_search(&mut self, query: String) {
        if self.loading {
            return;
        }
        self.loading = true;
        let result = self.search.run(&mut self.services, &query, 0).await;
        self.loading = false;
        match result {
            Ok(()) => {
                self.pane = Pane::Search;
                self.comments = None;
                self.return_stack.clear();
                self.matches.clear();
                self.status = Some(format!(
                    "{} results for '{}'",
                    self.search.rows.len(),
                    self.search.query
                ));
            }
            Err(err) => self.report(err),
        }
    }

    async fn search_page_step(&mut self, delta: i64) {
        if self.pane != Pane::Search || self.loading {
            return;
        }
        let target = if delta > 0 {
            if !self.search.has_next_page() {
                return;
            }
            self.search.page + 1
        } else {
            if !self.search.has_prev_page() {
                return;
            }
            self.search.page - 1
        };
        let query = self.search.query.clone();
        self.loading = true;
        let result = self.search.run(&mut self.services, &query, target).await;
        self.loading = false;
        match result {
            Ok(()) => self.matches.clear(),
            Err(err) => self.report(err),
        }
    }

    /// Re-run the active pane's load; serves as the manual retry after a
    /// transient failure.
    async fn refresh(&mut self) {
        match self.pane {
            Pane::Feed => {
                let kind = self.feed.kind;
                self.reload_feed(kind).await;
            }
            Pane::Search => {
                if !self.search.query.is_empty() {
                    let query = self.search.query.clone();
                    let page = self.search.page;
                    if self.loading {
                        return;
                    }
                    self.loading = true;
                    let result = self.search.run(&mut self.services, &query, page).await;
                    self.loading = false;
                    if let Err(err) = result {
                        self.report(err);
                    }
                }
            }
            Pane::Comments => {
                let Some(story) = self.comments.as_ref().map(|c| c.story.clone()) else {
                    return;
                };
                if self.loading {
                    return;
                }
                self.loading = true;
                let result = self.load_thread(&story).await;
                self.loading = false;
                match result {
                    Ok(comments) => self.comments = Some(comments),
                    Err(err) => self.report(err),
                }
            }
        }
    }

    fn toggle_collapse(&mut self) {
        if self.pane == Pane::Comments {
            if let Some(comments) = self.comments.as_mut() {
                comments.toggle_selected();
            }
        }
    }

    /// Convert any failure into a status message. A persistence failure
    /// additionally flips the cache to memory-only for the session.
    fn report(&mut self, err: EmberError) {
        tracing::warn!(error = %err, "operation failed");
        if matches!(err, EmberError::CachePersist(_)) {
            self.services.cache.degrade_to_memory();
            self.status = Some(format!("{err}; continuing without disk cache"));
        } else {
            self.status = Some(err.to_string());
        }
    }
}
