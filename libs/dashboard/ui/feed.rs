//! Notification list widget

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::live_indicator;
use crate::notifications::{NotificationFeed, Severity};

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Info => Color::Cyan,
        Severity::Error => Color::Red,
    }
}

/// Draw the visible notifications, newest first
pub fn draw_feed(frame: &mut Frame, feed: &NotificationFeed, area: Rect) {
    let items: Vec<ListItem> = feed
        .entries()
        .map(|entry| {
            let style = Style::default().fg(severity_color(entry.severity()));
            let time = entry.timestamp.format("%H:%M:%S").to_string();

            let mut lines = vec![Line::from(vec![
                Span::styled(format!("[{}] ", entry.id), Style::default().fg(Color::DarkGray)),
                Span::styled(entry.title, style.add_modifier(Modifier::BOLD)),
                Span::raw(format!("  {}", time)),
            ])];
            lines.push(Line::from(format!("    {}", entry.message)));
            if let Some(user) = &entry.user {
                let who = match &user.name {
                    Some(name) => format!("    {} <{}>", name, user.email),
                    None => format!("    {}", user.email),
                };
                lines.push(Line::from(Span::styled(who, Style::default().fg(Color::Gray))));
            }

            ListItem::new(lines)
        })
        .collect();

    let title = Line::from(vec![
        Span::raw(" Notifications "),
        live_indicator(feed.is_connected()),
        Span::raw(" "),
    ]);

    let list = if items.is_empty() {
        List::new(vec![ListItem::new("  No recent notifications")])
    } else {
        List::new(items)
    };

    frame.render_widget(
        list.block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}
