use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Paces outbound calls to the SEC API: `await_slot` suspends until at
/// least `interval` has passed since the previous slot was granted.
///
/// The timestamp is taken after any sleep, so spacing is measured from the
/// last actual grant and a tight loop cannot accumulate drift. Holding the
/// mutex across the sleep serializes concurrent callers, which is exactly
/// the pacing we want.
pub struct RateLimiter {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        RateLimiter {
            interval,
            last_call: Mutex::new(None),
        }
    }

    pub async fn await_slot(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_spacing_between_slots() {
        let limiter = RateLimiter::new(Duration::from_millis(500));

        limiter.await_slot().await;
        let first = Instant::now();
        limiter.await_slot().await;
        let second = Instant::now();

        assert!(second - first >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_interval_elapsed() {
        let limiter = RateLimiter::new(Duration::from_millis(500));

        limiter.await_slot().await;
        tokio::time::sleep(Duration::from_millis(600)).await;

        let before = Instant::now();
        limiter.await_slot().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tight_loop_does_not_drift() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        let start = Instant::now();
        for _ in 0..5 {
            limiter.await_slot().await;
        }
        // First slot is immediate, the next four each wait 100ms.
        assert_eq!(Instant::now() - start, Duration::from_millis(400));
    }
}
