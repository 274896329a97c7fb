//! Live notification feed
//!
//! Attaches to the shared notification channel and redraws the newest user
//! events until Ctrl+C. Entries disappear after the configured expiry.
//!
//! Usage:
//!   cargo run --bin notification_feed
//!
//! Environment:
//!   DASHBOARD_CONFIG_PATH - config file (default: config/dashboard.yaml)
//!   WS_URL                - notification endpoint override

use anyhow::Result;
use chrono::Utc;
use crypto_dashboard::bin_common::{load_dashboard_config, BinaryRunner, RunConfig, ShutdownManager};
use dashboard::notifications::{NotificationChannel, NotificationFeed, Severity};
use dashboard::{init_tracing, DashboardConfig};
use std::io::{self, Write};

/// Clear terminal and move cursor to top-left
fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
    let _ = io::stdout().flush();
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "\x1B[32m",
        Severity::Info => "\x1B[36m",
        Severity::Error => "\x1B[31m",
    }
}

struct NotificationFeedApp {
    run_config: RunConfig,
    config: DashboardConfig,
    shutdown: ShutdownManager,
    total_received: u64,
}

impl NotificationFeedApp {
    fn render(&self, feed: &NotificationFeed) {
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let status = if feed.is_connected() {
            "\x1B[32m● LIVE\x1B[0m"
        } else {
            "\x1B[33m○ OFFLINE\x1B[0m"
        };

        clear_screen();
        println!("════════════════════════════════════════════════════════════════════════");
        println!("  NOTIFICATIONS  {}", status);
        println!("════════════════════════════════════════════════════════════════════════");
        println!("  Server: {}", self.config.notifications.url);
        println!("  Time: {}    Received: {}", now, feed.total_received());
        println!("  Press Ctrl+C to stop");
        println!("════════════════════════════════════════════════════════════════════════");
        println!();

        if feed.is_empty() {
            println!("  No recent notifications");
        }

        for entry in feed.entries() {
            println!(
                "  {}{}\x1B[0m  [{}]  {}",
                severity_color(entry.severity()),
                entry.title,
                entry.id,
                entry.timestamp.format("%H:%M:%S")
            );
            println!("      {}", entry.message);
            if let Some(user) = &entry.user {
                match &user.name {
                    Some(name) => println!("      \x1B[90m{} <{}>\x1B[0m", name, user.email),
                    None => println!("      \x1B[90m{}\x1B[0m", user.email),
                }
            }
            println!();
        }
    }
}

impl BinaryRunner for NotificationFeedApp {
    async fn run(&mut self) -> Result<()> {
        self.shutdown.spawn_signal_handler();

        let channel = NotificationChannel::new(&self.config.notifications)?;
        let feed = NotificationFeed::from_config(&self.config.feed).shared();
        let _subscription = NotificationFeed::attach(&feed, &channel);

        while self.shutdown.is_running() {
            self.render(&NotificationFeed::snapshot(&feed));
            self.shutdown
                .interruptible_sleep(self.run_config.refresh_interval())
                .await;
        }

        clear_screen();
        channel.close().await;
        self.total_received = feed.read().total_received();
        Ok(())
    }

    fn shutdown_stats(&self) -> Option<String> {
        Some(format!("Notifications received: {}", self.total_received))
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_dashboard_config()?;
    init_tracing(config.log_level.as_str());
    config.log();

    let mut app = NotificationFeedApp {
        run_config: RunConfig::new("Notification Feed").with_refresh_interval(250),
        config,
        shutdown: ShutdownManager::new(),
        total_received: 0,
    };

    app.execute().await
}
