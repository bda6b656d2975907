//! Fixed-window per-client rate limiting.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Counter for one client within its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub window_reset_at: Instant,
}

impl RateLimitEntry {
    fn open(now: Instant, window: Duration) -> Self {
        Self {
            count: 1,
            window_reset_at: now + window,
        }
    }
}

/// Outcome of a single rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub limited: bool,
    /// Requests seen in the current window, including this one.
    pub count: u32,
}

/// Per-client fixed-window counter.
///
/// Windows start at a client's first request and are replaced (never
/// extended) by the first request strictly after `window_reset_at`. Every
/// request past `max_requests` inside a window is limited until it ends.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    max_requests: u32,
    window: Duration,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests: config.max_requests,
            window: config.window(),
            enabled: config.enabled,
        }
    }

    /// Check a request from `client` arriving now.
    pub fn check(&self, client: &str) -> RateLimitDecision {
        self.check_at(client, tokio::time::Instant::now().into_std())
    }

    /// Check a request from `client` arriving at `now`.
    pub fn check_at(&self, client: &str, now: Instant) -> RateLimitDecision {
        if !self.enabled {
            return RateLimitDecision {
                limited: false,
                count: 0,
            };
        }

        // The entry guard holds the shard lock, so read-modify-write per key is atomic.
        let count = match self.entries.entry(client.to_owned()) {
            Entry::Vacant(vacant) => {
                vacant.insert(RateLimitEntry::open(now, self.window));
                1
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if now > entry.window_reset_at {
                    *entry = RateLimitEntry::open(now, self.window);
                } else {
                    entry.count = entry.count.saturating_add(1);
                }
                entry.count
            }
        };

        RateLimitDecision {
            limited: count > self.max_requests,
            count,
        }
    }

    /// Current entry for `client`, if one exists.
    pub fn entry(&self, client: &str) -> Option<RateLimitEntry> {
        self.entries.get(client).map(|e| *e.value())
    }

    /// Number of tracked clients, expired windows included.
    pub fn tracked_clients(&self) -> usize {
        self.entries.len()
    }

    /// Drop entries whose window ended before `now`. Returns how many were removed.
    ///
    /// Only entries that the next request would replace anyway are removed, so
    /// sweeping never changes a decision.
    pub fn sweep_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.window_reset_at);
        let removed = before.saturating_sub(self.entries.len());
        metrics::record_rate_limit_entries(self.entries.len());
        removed
    }

    /// Periodically sweep expired entries until shutdown.
    pub async fn run_sweeper(self: Arc<Self>, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep_expired_at(tokio::time::Instant::now().into_std());
                    tracing::debug!(
                        removed,
                        remaining = self.tracked_clients(),
                        "Swept expired rate limit windows"
                    );
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Rate limit sweeper stopping");
                    break;
                }
            }
        }
    }
}
