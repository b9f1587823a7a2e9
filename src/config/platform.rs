use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime platform the client is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Web,
    Desktop,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Web => "web",
            Self::Desktop => "desktop",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Timing and retry budget for one platform.
///
/// Android gets the longest budget: its network stack is the slowest to
/// warm up on a cold start.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformProfile {
    pub platform: Platform,
    /// Whether the app runs on an emulator/simulator rather than hardware
    pub is_emulator: bool,
    /// Deadline for a single HTTP request
    pub request_timeout: Duration,
    /// Deadline for one realtime handshake attempt
    pub handshake_timeout: Duration,
    /// Reconnect attempts before the realtime client gives up
    pub max_retries: u32,
}

impl PlatformProfile {
    pub fn new(platform: Platform, is_emulator: bool) -> Self {
        let (request_ms, handshake_ms, max_retries) = match platform {
            Platform::Android => (15_000, 10_000, 5),
            Platform::Ios => (10_000, 8_000, 3),
            Platform::Web | Platform::Desktop => (8_000, 5_000, 3),
        };

        Self {
            platform,
            is_emulator,
            request_timeout: Duration::from_millis(request_ms),
            handshake_timeout: Duration::from_millis(handshake_ms),
            max_retries,
        }
    }

    /// Extra headers sent with every HTTP request on this platform.
    pub fn extra_headers(&self) -> &'static [(&'static str, &'static str)] {
        match self.platform {
            Platform::Android => &[("Connection", "keep-alive"), ("Cache-Control", "no-cache")],
            Platform::Ios => &[("Cache-Control", "no-cache")],
            Platform::Web | Platform::Desktop => &[],
        }
    }
}
