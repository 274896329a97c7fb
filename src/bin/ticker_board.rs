//! Ticker Board - Terminal UI for live prices and notifications
//!
//! One ticker connection per symbol plus the shared notification channel:
//! - Price table with 24h change and per-symbol live status
//! - Notification panel with the newest user events
//!
//! Usage:
//!   cargo run --bin ticker_board [symbols...]
//!
//! Keys: q/Esc/Ctrl+C quit, r reconnect stopped streams, d dismiss newest notification

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame, Terminal,
};

use crypto_dashboard::bin_common::{load_dashboard_config, parse_args};
use dashboard::notifications::{NotificationChannel, NotificationFeed, SharedNotificationFeed};
use dashboard::ui::{draw_board, draw_feed};
use dashboard::{DashboardConfig, TickerBoard};
use pulsesocket::Subscription;

struct App {
    board: TickerBoard,
    channel: NotificationChannel,
    feed: SharedNotificationFeed,
    _feed_subscription: Subscription,
    should_quit: bool,
}

impl App {
    /// Start every ticker stream and attach the notification panel
    ///
    /// Must run inside the tokio runtime.
    fn initialize(config: &DashboardConfig) -> Result<Self> {
        let board = TickerBoard::new(config.tickers.clone());
        board.start_configured()?;

        let channel = NotificationChannel::new(&config.notifications)?;
        let feed = NotificationFeed::from_config(&config.feed).shared();
        let feed_subscription = NotificationFeed::attach(&feed, &channel);

        Ok(Self {
            board,
            channel,
            feed,
            _feed_subscription: feed_subscription,
            should_quit: false,
        })
    }

    fn tick(&self) {
        self.feed.write().expire();
    }

    fn reconnect(&self) {
        self.board.reconnect_terminal();
        self.channel.connect();
    }

    fn dismiss_newest(&self) {
        self.feed.write().dismiss_newest();
    }

    async fn shutdown(&self) {
        self.board.shutdown().await;
        self.channel.close().await;
    }
}

fn main() -> Result<()> {
    // Note: Logging is disabled for TUI - it would corrupt the alternate screen display

    let mut config = load_dashboard_config()?;
    let symbols = parse_args();
    if !symbols.is_empty() {
        config.tickers.symbols = symbols.iter().map(|s| s.to_lowercase()).collect();
        config.validate()?;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let guard = runtime.enter();

    let mut app = App::initialize(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    drop(guard);
    runtime.block_on(app.shutdown());

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|frame| draw(frame, app))?;

        // Handle input with 10ms timeout (for real-time updates)
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            app.should_quit = true;
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            app.should_quit = true;
                        }
                        KeyCode::Char('r') => {
                            app.reconnect();
                        }
                        KeyCode::Char('d') => {
                            app.dismiss_newest();
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(frame: &mut Frame, app: &App) {
    let tickers = app.board.snapshots();
    let board_height = u16::try_from(tickers.len()).unwrap_or(u16::MAX).saturating_add(3);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(board_height),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_board(frame, &tickers, chunks[0]);
    draw_feed(frame, &app.feed.read(), chunks[1]);

    let help = Paragraph::new(" q quit   r reconnect   d dismiss")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);
}
