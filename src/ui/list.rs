// Story list rendering for the feed and search panes.
// Styled rows with loading-free empty states.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::hn::{DisplayRow, RowKind};
use crate::state::PaneCursor;

/// Format a timestamp as relative time (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*dt);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

/// Render a feed or search result list.
pub fn render_story_list(
    frame: &mut Frame,
    title: &str,
    rows: &[DisplayRow],
    cursor: &mut PaneCursor,
    area: Rect,
) {
    if rows.is_empty() {
        render_empty(frame, area, "Nothing loaded yet");
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let kind_tag = match row.kind {
                RowKind::Story => "",
                RowKind::Job => "[job] ",
                RowKind::Poll => "[poll] ",
            };
            let meta = format!(
                "  {}p · {}c · {} · {}",
                row.score,
                row.comment_count,
                row.author,
                format_relative_time(&row.time)
            );
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>3}. ", index + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(kind_tag.to_string(), Style::default().fg(Color::Magenta)),
                Span::styled(row.title.clone(), Style::default().fg(Color::Cyan)),
                Span::styled(meta, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list_widget = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, &mut cursor.list_state);
}
