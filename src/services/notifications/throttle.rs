//! Minimum spacing between requests made by one provider.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a maximum request rate by sleeping before a request when the
/// previous one was too recent
#[derive(Debug)]
pub struct Throttle {
    min_interval: Option<Duration>,
    last_request: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Allow at most `rate_per_sec` requests per second; `0` disables
    pub fn new(rate_per_sec: f64) -> Self {
        let min_interval = (rate_per_sec.is_finite() && rate_per_sec > 0.0)
            .then(|| Duration::from_secs_f64(1.0 / rate_per_sec));

        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0.0)
    }

    pub fn is_enabled(&self) -> bool {
        self.min_interval.is_some()
    }

    /// Wait until another request is allowed and record it
    pub async fn wait(&self) {
        let Some(min_interval) = self.min_interval else {
            return;
        };

        let mut last_request = self.last_request.lock().await;
        if let Some(previous) = *last_request {
            let elapsed = previous.elapsed();
            if elapsed < min_interval {
                let delay = min_interval - elapsed;
                tracing::debug!(delay_ms = delay.as_millis() as u64, "Throttling request");
                tokio::time::sleep(delay).await;
            }
        }
        *last_request = Some(Instant::now());
    }
}
