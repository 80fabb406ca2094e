use std::time::Duration;

/// Base access delay when the CLI does not override it.
pub const DEFAULT_ACCESS_DELAY_MS: u64 = 10;

/// Simulated storage-access latency.
///
/// Every event lookup and every individual seat read/write pays one `access`.
/// The sleep suspends only the calling task; whether a lock is held while
/// sleeping is the caller's call (the engine keeps the per-event lock across
/// per-seat delays).
#[derive(Debug, Clone, Copy)]
pub struct DelaySim {
    delay: Duration,
}

impl DelaySim {
    pub fn from_ms(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// One simulated storage access.
    pub async fn access(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Suspension for a WAIT command; unrelated to the base access delay.
    pub async fn wait_ms(delay_ms: u64) {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn access_sleeps_the_configured_delay() {
        let sim = DelaySim::from_ms(50);
        let before = Instant::now();
        sim.access().await;
        assert_eq!(before.elapsed(), Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_returns_immediately() {
        let sim = DelaySim::from_ms(0);
        let before = Instant::now();
        sim.access().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_is_independent_of_base_delay() {
        let before = Instant::now();
        DelaySim::wait_ms(120).await;
        assert_eq!(before.elapsed(), Duration::from_millis(120));
    }
}
