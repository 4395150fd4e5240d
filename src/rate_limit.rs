use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

pub const DEFAULT_CURRENCY_PAUSE: Duration = Duration::from_secs(1);

/// Paces the run. The orchestrator calls `pause` once per currency, after both sides.
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn pause(&self);
}

#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_PAUSE)
    }
}

#[async_trait]
impl Throttle for FixedDelay {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}
