// UI module for rendering the TUI.
// Header, pane content, and the combined input/status bar.

mod comments;
mod list;

use ratatui::{prelude::*, widgets::*};

use crate::app::App;
use crate::state::{InputMode, Pane};

/// Main draw function that renders the entire UI.
pub fn draw<P, S>(frame: &mut Frame, app: &mut App<P, S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Input / status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_bottom_bar(frame, app, chunks[2]);
}

/// Draw the one-line header with the active pane's context.
fn draw_header<P, S>(frame: &mut Frame, app: &App<P, S>, area: Rect) {
    let context = match app.pane {
        Pane::Feed => format!(
            " ember · {} {}/{}",
            app.feed.kind.label(),
            app.feed.rows.len(),
            app.feed.ids.len()
        ),
        Pane::Search => format!(
            " ember · search '{}' · page {}/{}",
            app.search.query,
            app.search.page + 1,
            app.search.total_pages.max(1)
        ),
        Pane::Comments => match &app.comments {
            Some(comments) => format!(" ember · {}", comments.story.title),
            None => " ember".to_string(),
        },
    };
    let header = Paragraph::new(context).style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(header, area);
}

/// Draw the main content area based on the active pane.
fn draw_content<P, S>(frame: &mut Frame, app: &mut App<P, S>, area: Rect) {
    match app.pane {
        Pane::Feed => {
            let title = format!(" {} stories ", app.feed.kind.label());
            list::render_story_list(frame, &title, &app.feed.rows, &mut app.feed.cursor, area);
        }
        Pane::Search => {
            list::render_story_list(
                frame,
                " Search results ",
                &app.search.rows,
                &mut app.search.cursor,
                area,
            );
        }
        Pane::Comments => comments::render_comments(frame, app.comments.as_mut(), area),
    }
}

/// Draw the bottom line: the active entry buffer, a status message, or the
/// key hints.
fn draw_bottom_bar<P, S>(frame: &mut Frame, app: &App<P, S>, area: Rect) {
    let line = match app.input {
        InputMode::LocalSearch => entry_line("/", &app.buffer),
        InputMode::GlobalSearch => entry_line("search: ", &app.buffer),
        InputMode::None => match &app.status {
            Some(status) => Line::from(Span::styled(
                format!(" {status}"),
                Style::default().fg(Color::Yellow),
            )),
            None => Line::from(Span::styled(
                " j/k move · gg/G top/bottom · enter comments · space fold · o open · / filter · s search · [/] pages · 1-6 feeds · q quit",
                Style::default().fg(Color::DarkGray),
            )),
        },
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn entry_line(prefix: &str, buffer: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {prefix}"),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(buffer.to_string()),
        Span::styled("█", Style::default().fg(Color::Yellow)),
    ])
}
