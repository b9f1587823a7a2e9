// Static configuration: endpoint table and per-platform budgets
mod endpoints;
mod platform;

pub use endpoints::{Endpoint, EndpointTable};
pub use platform::{Platform, PlatformProfile};

use crate::types::{DEFAULT_PORT, Result};
use serde::Deserialize;
use std::time::Duration;

/// LAN address tried last by the built-in tables (physical devices on the
/// developer's network)
const LAN_HOST: &str = "192.168.1.100";

/// Static configuration for the whole network layer.
///
/// Usually built once from [`NetworkConfig::for_platform`] or from a JSON
/// document bundled with the app:
///
/// ```
/// use chatlink::NetworkConfig;
///
/// let config = NetworkConfig::from_json(r#"{
///     "base_urls": ["https://chat.example.com", "https://backup.example.com"],
///     "platform": "ios",
///     "request_timeout_ms": 12000
/// }"#).unwrap();
/// assert_eq!(config.profile().request_timeout.as_millis(), 12000);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Base URLs in priority order; the first one is the primary
    pub base_urls: Vec<String>,
    pub platform: Platform,
    #[serde(default)]
    pub is_emulator: bool,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub handshake_timeout_ms: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl NetworkConfig {
    /// Built-in endpoint table for a platform.
    ///
    /// The Android emulator reaches the host machine through `10.0.2.2`, so
    /// that address goes first there; everything else starts at `localhost`.
    pub fn for_platform(platform: Platform, is_emulator: bool) -> Self {
        let host = |h: &str| format!("http://{}:{}", h, DEFAULT_PORT);
        let base_urls = if platform == Platform::Android && is_emulator {
            vec![host("10.0.2.2"), host("localhost"), host("127.0.0.1")]
        } else if platform == Platform::Android {
            vec![host(LAN_HOST), host("10.0.2.2"), host("localhost")]
        } else {
            vec![host("localhost"), host("127.0.0.1"), host(LAN_HOST)]
        };

        Self {
            base_urls,
            platform,
            is_emulator,
            request_timeout_ms: None,
            handshake_timeout_ms: None,
            max_retries: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Platform budget with any overrides from this config applied.
    pub fn profile(&self) -> PlatformProfile {
        let mut profile = PlatformProfile::new(self.platform, self.is_emulator);
        if let Some(ms) = self.request_timeout_ms {
            profile.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.handshake_timeout_ms {
            profile.handshake_timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = self.max_retries {
            profile.max_retries = retries;
        }
        profile
    }

    pub fn endpoint_table(&self) -> Result<EndpointTable> {
        EndpointTable::new(&self.base_urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_android_emulator_prefers_host_alias() {
        let config = NetworkConfig::for_platform(Platform::Android, true);
        let table = config.endpoint_table().unwrap();
        assert_eq!(table.primary().to_string(), "http://10.0.2.2:8000");
    }

    #[test]
    fn test_ios_starts_at_localhost() {
        let config = NetworkConfig::for_platform(Platform::Ios, true);
        let table = config.endpoint_table().unwrap();
        assert_eq!(table.primary().to_string(), "http://localhost:8000");
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_overrides_apply_to_profile() {
        let config = NetworkConfig::from_json(
            r#"{
                "base_urls": ["http://a:1"],
                "platform": "android",
                "max_retries": 1,
                "handshake_timeout_ms": 250
            }"#,
        )
        .unwrap();
        let profile = config.profile();
        assert_eq!(profile.max_retries, 1);
        assert_eq!(profile.handshake_timeout, Duration::from_millis(250));
        assert_eq!(profile.request_timeout, Duration::from_millis(15_000));
        assert!(!profile.is_emulator);
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        assert!(matches!(
            NetworkConfig::from_json("{"),
            Err(crate::NetError::Serialization(_))
        ));
    }
}
