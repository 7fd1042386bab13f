//! Process-wide sliding-window limiter for calls to the AI API.
//!
//! Admission is serialized: the lock is held while a caller waits for the window
//! to open, so concurrent callers queue up instead of racing for the same slot.
//! Under bursts this over-throttles rather than exceed the upstream quota.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::info;

const WINDOW: Duration = Duration::from_secs(60);
const SAFETY_MARGIN: Duration = Duration::from_millis(100);

pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Limiter admitting at most `max_calls_per_minute` calls in any trailing minute.
    pub fn new(max_calls_per_minute: usize) -> Self {
        Self {
            max_calls: max_calls_per_minute.max(1),
            window: WINDOW,
            calls: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait until a call is admissible, then record it.
    pub async fn wait_if_needed(&self) {
        let mut calls = self.calls.lock().await;
        let mut now = Instant::now();
        self.prune(&mut calls, now);

        if calls.len() >= self.max_calls {
            if let Some(&oldest) = calls.front() {
                let wait = (oldest + self.window + SAFETY_MARGIN).saturating_duration_since(now);
                if !wait.is_zero() {
                    info!(
                        wait_ms = wait.as_millis() as u64,
                        max_calls = self.max_calls,
                        "Rate limit reached, waiting for window"
                    );
                    sleep(wait).await;
                    now = Instant::now();
                    self.prune(&mut calls, now);
                }
            }
        }

        calls.push_back(now);
    }

    #[cfg(test)]
    async fn recent_calls(&self) -> usize {
        let mut calls = self.calls.lock().await;
        self.prune(&mut calls, Instant::now());
        calls.len()
    }

    fn prune(&self, calls: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = calls.front() {
            if now.duration_since(oldest) < self.window {
                break;
            }
            calls.pop_front();
        }
    }
}
