// Comment pane rendering.
// Flattened thread rows with depth indentation and collapse markers.

use ratatui::{prelude::*, widgets::*};

use crate::state::{CommentsPane, descendant_count};

use super::list::{format_relative_time, render_empty};

/// Render the flattened comment thread for the active story.
pub fn render_comments(frame: &mut Frame, pane: Option<&mut CommentsPane>, area: Rect) {
    let Some(pane) = pane else {
        render_empty(frame, area, "No thread loaded");
        return;
    };

    let visible = pane.visible();
    if visible.is_empty() {
        render_empty(frame, area, "No comments yet");
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = visible
        .iter()
        .map(|node| {
            let indent = "  ".repeat(node.depth);
            let collapsed = pane.collapsed.contains(&node.id);
            let marker = if collapsed {
                format!("[+{}]", descendant_count(node))
            } else {
                String::new()
            };

            let mut lines = vec![Line::from(vec![
                Span::raw(indent.clone()),
                Span::styled(
                    format!("{} ", node.author),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format_relative_time(&node.time),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!(" {marker}"), Style::default().fg(Color::Yellow)),
            ])];
            if !collapsed {
                let text_width = width.saturating_sub(indent.len());
                for text_line in wrap_text(&node.text, text_width) {
                    lines.push(Line::from(vec![
                        Span::raw(indent.clone()),
                        Span::raw(text_line),
                    ]));
                }
            }
            ListItem::new(lines)
        })
        .collect();
    drop(visible);

    let title = format!(
        " {} · {} comments ",
        pane.story.title, pane.story.comment_count
    );
    let list_widget = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, &mut pane.cursor.list_state);
}

/// Greedy word wrap for comment text (rendering only; long unbreakable
/// words overflow and are clipped by the list widget).
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(16);
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut current = String::new();
        for word in raw.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
