use std::fmt::Debug;
use std::time::Duration;

/// Decides whether, and after how long, a dropped connection is retried.
///
/// `attempts` counts the automatic reconnect attempts already made since the
/// last successful open. The manager asks `should_reconnect(attempts)` after
/// every close; if it returns `true` the counter is incremented and the next
/// attempt is scheduled after `delay(attempts + 1)`.
pub trait ReconnectionStrategy: Send + Sync + Debug + 'static {
    /// Retry ceiling (`None` = unlimited)
    fn max_attempts(&self) -> Option<usize>;

    /// Delay before the given attempt (1-indexed)
    fn delay(&self, attempt: usize) -> Duration;

    /// Check if another automatic attempt is allowed
    fn should_reconnect(&self, attempts: usize) -> bool {
        self.max_attempts().map_or(true, |max| attempts < max)
    }
}

/// Fixed delay reconnection strategy
///
/// Waits the same amount of time before every attempt. This is the
/// dashboard default: 3 seconds, 5 attempts.
#[derive(Debug, Clone)]
pub struct FixedDelay {
    delay: Duration,
    max_attempts: Option<usize>,
}

impl FixedDelay {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);
    pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

    pub fn new(delay: Duration, max_attempts: Option<usize>) -> Self {
        Self { delay, max_attempts }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY, Some(Self::DEFAULT_MAX_ATTEMPTS))
    }
}

impl ReconnectionStrategy for FixedDelay {
    fn max_attempts(&self) -> Option<usize> {
        self.max_attempts
    }

    fn delay(&self, _attempt: usize) -> Duration {
        self.delay
    }
}

/// Exponential backoff reconnection strategy
///
/// `initial_delay * 2^(attempt - 1)`, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: Option<usize>,
}

impl ExponentialBackoff {
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }
}

impl ReconnectionStrategy for ExponentialBackoff {
    fn max_attempts(&self) -> Option<usize> {
        self.max_attempts
    }

    fn delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as u32;
        let factor = 1u32 << exponent;
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Never reconnect strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverReconnect;

impl ReconnectionStrategy for NeverReconnect {
    fn max_attempts(&self) -> Option<usize> {
        Some(0)
    }

    fn delay(&self, _attempt: usize) -> Duration {
        Duration::ZERO
    }
}
