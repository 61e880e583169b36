//! Dual sliding-window request rate limiter.
//!
//! One limiter instance is constructed by the orchestrator and handed to
//! the review-source client, giving a hard process-wide ceiling on both
//! short-burst (per-second) and sustained (per-minute) request rate. All
//! fetch attempts, retries included, funnel through [`RateLimiter::admit`].

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

const MINUTE_WINDOW: Duration = Duration::from_secs(60);
const SECOND_WINDOW: Duration = Duration::from_secs(1);

/// Small cushion added to computed waits so a re-check after sleeping lands
/// strictly outside the window instead of right on its edge.
const WAIT_MARGIN: Duration = Duration::from_millis(50);

/// Enforces `max_per_second` and `max_per_minute` ceilings on admissions.
///
/// Cannot fail and has no side effects beyond its internal timestamp list.
pub struct RateLimiter {
    max_per_second: usize,
    max_per_minute: usize,
    timestamps: Mutex<Vec<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_per_second: usize, max_per_minute: usize) -> Self {
        Self {
            max_per_second: max_per_second.max(1),
            max_per_minute: max_per_minute.max(1),
            timestamps: Mutex::new(Vec::new()),
        }
    }

    /// Block until one more request may be issued, then record it.
    ///
    /// Iterative wait-and-recheck loop: prune timestamps older than the
    /// 60-second window, and if either window is full, sleep until its
    /// oldest entry falls out (plus a small margin) and re-check from the
    /// top. The lock is never held across a sleep.
    pub async fn admit(&self) {
        loop {
            let wait = {
                let mut timestamps = self.timestamps.lock().await;
                let now = Instant::now();

                timestamps.retain(|t| now.duration_since(*t) < MINUTE_WINDOW);

                if timestamps.len() >= self.max_per_minute {
                    // Oldest entry in the minute window decides the wait.
                    let oldest = timestamps[0];
                    Some(MINUTE_WINDOW - now.duration_since(oldest) + WAIT_MARGIN)
                } else {
                    let in_second: Vec<Instant> = timestamps
                        .iter()
                        .copied()
                        .filter(|t| now.duration_since(*t) < SECOND_WINDOW)
                        .collect();
                    if in_second.len() >= self.max_per_second {
                        let oldest = in_second[0];
                        Some(SECOND_WINDOW - now.duration_since(oldest) + WAIT_MARGIN)
                    } else {
                        timestamps.push(now);
                        None
                    }
                }
            };

            match wait {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return,
            }
        }
    }
}
