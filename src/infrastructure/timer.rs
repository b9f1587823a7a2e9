use std::time::Duration;
use tokio::time::sleep;

/// Exponential reconnect backoff with a delay ceiling and an attempt cap.
pub struct Timer {
    attempts: u32,
    base: Duration,
    max_delay: Duration,
    max_attempts: u32,
}

impl Timer {
    pub fn new(base: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            base,
            max_delay,
            max_attempts,
        }
    }

    /// Delay before the next attempt, or `None` once the cap is reached.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        let exp = self.attempts.min(16);
        let delay = self.base.saturating_mul(2u32.saturating_pow(exp));
        self.attempts += 1;
        Some(delay.min(self.max_delay))
    }

    /// Attempts handed out so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Reset the timer
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Sleeps for the next delay. Returns `false` once attempts are exhausted.
    pub async fn schedule_timeout(&mut self) -> bool {
        match self.next_delay() {
            Some(delay) => {
                sleep(delay).await;
                true
            }
            None => false,
        }
    }
}
