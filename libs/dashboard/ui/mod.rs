//! Terminal widgets for the dashboard binaries

pub mod board;
pub mod feed;

pub use board::draw_board;
pub use feed::draw_feed;

use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

/// Binary connected indicator driven by status envelopes
pub fn live_indicator(connected: bool) -> Span<'static> {
    if connected {
        Span::styled(
            "● LIVE",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("○ OFFLINE", Style::default().fg(Color::Yellow))
    }
}
