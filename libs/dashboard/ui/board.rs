//! Ticker table widget

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use super::live_indicator;
use crate::ticker::{TickerState, Trend};

fn trend_color(trend: Trend) -> Color {
    match trend {
        Trend::Up => Color::Green,
        Trend::Down => Color::Red,
        Trend::Flat => Color::Gray,
    }
}

/// Draw one row per ticker: asset, price, 24h change, live status
pub fn draw_board(frame: &mut Frame, tickers: &[TickerState], area: Rect) {
    let header = Row::new(vec!["ASSET", "NAME", "PRICE (USDT)", "24H", "STATUS"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = tickers
        .iter()
        .map(|ticker| {
            let asset = ticker.asset();
            let trend = ticker.trend();
            let color = trend_color(trend);

            Row::new(vec![
                Cell::from(format!("{} {}", asset.icon, asset.label)),
                Cell::from(asset.name),
                Cell::from(Span::styled(
                    ticker.formatted_price(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Cell::from(Span::styled(
                    format!("{} {}", trend.arrow(), ticker.formatted_change()),
                    Style::default().fg(color),
                )),
                Cell::from(live_indicator(ticker.is_connected())),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(16),
        Constraint::Length(12),
        Constraint::Min(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" Tickers "));

    frame.render_widget(table, area);
}
