use crate::types::{DEFAULT_PING_INTERVAL, DEFAULT_PING_TIMEOUT};
use std::time::Duration;
use tokio::time::Instant;

/// Detects a silent connection.
///
/// Engine.IO servers ping every `ping_interval` and give up after
/// `ping_timeout`; a client that hears nothing for the sum of both treats the
/// link as dead.
#[derive(Debug, Clone)]
pub struct HeartbeatMonitor {
    window: Duration,
    last_seen: Instant,
}

impl HeartbeatMonitor {
    pub fn new(ping_interval: Duration, ping_timeout: Duration) -> Self {
        Self {
            window: ping_interval + ping_timeout,
            last_seen: Instant::now(),
        }
    }

    /// Records inbound traffic
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Instant after which the link counts as dead
    pub fn deadline(&self) -> Instant {
        self.last_seen + self.window
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline()
    }
}

impl Default for HeartbeatMonitor {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_PING_INTERVAL),
            Duration::from_millis(DEFAULT_PING_TIMEOUT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_interval_plus_timeout() {
        let monitor = HeartbeatMonitor::new(Duration::from_millis(100), Duration::from_millis(50));
        tokio::time::advance(Duration::from_millis(149)).await;
        assert!(!monitor.is_expired());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(monitor.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_pushes_deadline_forward() {
        let mut monitor =
            HeartbeatMonitor::new(Duration::from_millis(100), Duration::from_millis(50));
        tokio::time::advance(Duration::from_millis(120)).await;
        monitor.touch();
        tokio::time::advance(Duration::from_millis(120)).await;
        assert!(!monitor.is_expired());
    }
}
