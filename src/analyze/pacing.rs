use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use crate::config::PacingConfig;
use crate::error::Result;

/// Spaces out remote calls and retries the ones that fail transiently
pub struct Pacer {
    policy: PacingConfig,
    last_call: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(policy: PacingConfig) -> Self {
        Self {
            policy,
            last_call: Mutex::new(None),
        }
    }

    /// Pacer that never waits and never retries
    pub fn immediate() -> Self {
        Self::new(PacingConfig {
            min_delay_ms: 0,
            max_retries: 0,
            backoff_factor: 1.0,
            max_delay_ms: 0,
        })
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.policy.min_delay_ms)
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff_delay(&self, retry: u32) -> Duration {
        let base = self.policy.min_delay_ms as f64;
        let scaled = base * self.policy.backoff_factor.powi(retry.saturating_sub(1) as i32);
        let capped = scaled.min(self.policy.max_delay_ms.max(self.policy.min_delay_ms) as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    /// Run `op`, waiting out the minimum delay since the previous call and
    /// retrying retryable failures with backoff
    pub async fn call<F, Fut, T>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            sleep_until(previous + self.min_delay()).await;
        }

        let mut retry = 0;
        let outcome = loop {
            match op().await {
                Ok(value) => break Ok(value),
                Err(e) if e.is_retryable() && retry < self.policy.max_retries => {
                    retry += 1;
                    let delay = self.backoff_delay(retry);
                    warn!(
                        "Remote call failed ({}), retry {}/{} in {:?}",
                        e, retry, self.policy.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => break Err(e),
            }
        };

        *last_call = Some(Instant::now());
        debug!("Remote call finished after {} retries", retry);
        outcome
    }
}
