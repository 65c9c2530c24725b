use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::agent::AgentError;

/// Whatever the clock drives once per tick.
#[async_trait]
pub trait TickHandler: Send {
    async fn on_tick(&mut self, tick: u64) -> Result<(), AgentError>;

    /// Called once when the clock is cancelled, before `run` returns.
    async fn on_shutdown(&mut self);
}

/// Next tick number and how long to sleep until its boundary.
pub fn next_tick(now_secs: f64, base_interval: f64) -> (u64, Duration) {
    let position = now_secs / base_interval;
    let current = position.floor();
    let wait = base_interval * (1.0 - (position - current));
    (current as u64 + 1, Duration::from_secs_f64(wait.max(0.0)))
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClockStats {
    pub ticks: u64,
    pub failed_ticks: u64,
    pub slow: bool,
    pub cancelled: bool,
}

pub struct TickClock {
    base_interval: Duration,
    count: Option<u64>,
}

impl TickClock {
    pub fn new(base_interval: Duration) -> Self {
        Self {
            base_interval,
            count: None,
        }
    }

    /// Stop after `count` ticks instead of looping until cancelled.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub async fn run<H: TickHandler>(&self, handler: &mut H, cancel: &CancellationToken) -> ClockStats {
        let base = self.base_interval.as_secs_f64();
        let mut stats = ClockStats::default();
        let mut remaining = self.count;
        let mut last_start: Option<f64> = None;

        loop {
            if remaining == Some(0) {
                return stats;
            }
            if cancel.is_cancelled() {
                return shutdown(handler, stats).await;
            }

            let now = unix_secs();
            if let Some(last) = last_start {
                if now - last > base {
                    stats.slow = true;
                    tracing::warn!(
                        behind_s = now - last - base,
                        "tick loop is slow, skipping to the next tick boundary"
                    );
                }
            }
            last_start = Some(now);

            let (tick, wait) = next_tick(now, base);
            tokio::select! {
                _ = cancel.cancelled() => return shutdown(handler, stats).await,
                _ = tokio::time::sleep(wait) => {}
            }

            tracing::debug!(tick, "performing tick");
            stats.ticks += 1;
            if let Err(e) = handler.on_tick(tick).await {
                stats.failed_ticks += 1;
                tracing::error!(tick, error = %e, "tick failed");
            }

            remaining = remaining.map(|n| n - 1);
        }
    }
}

async fn shutdown<H: TickHandler>(handler: &mut H, mut stats: ClockStats) -> ClockStats {
    tracing::info!("clock cancelled, deregistering");
    handler.on_shutdown().await;
    stats.cancelled = true;
    stats
}

fn unix_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
