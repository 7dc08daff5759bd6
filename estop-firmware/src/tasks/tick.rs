//! Polling loop clock
//!
//! Role tasks run one polling pass per tick and feed the measured elapsed
//! time, not the nominal period, into the core.

use embassy_time::{Duration, Instant, Ticker};

/// Polling period in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1;

/// Counter stats are logged this often
pub const STATS_INTERVAL_MS: u32 = 10_000;

pub struct LoopClock {
    ticker: Ticker,
    last: Instant,
    since_stats_ms: u32,
}

impl LoopClock {
    pub fn new() -> Self {
        Self {
            ticker: Ticker::every(Duration::from_millis(TICK_INTERVAL_MS)),
            last: Instant::now(),
            since_stats_ms: 0,
        }
    }

    /// Wait for the next tick, returning milliseconds since the previous one
    pub async fn next(&mut self) -> u32 {
        self.ticker.next().await;
        let now = Instant::now();
        let dt_ms = (now - self.last).as_millis().min(u32::MAX as u64) as u32;
        self.last = now;
        self.since_stats_ms = self.since_stats_ms.saturating_add(dt_ms);
        dt_ms
    }

    /// True once per stats interval
    pub fn stats_due(&mut self) -> bool {
        if self.since_stats_ms >= STATS_INTERVAL_MS {
            self.since_stats_ms = 0;
            true
        } else {
            false
        }
    }
}
