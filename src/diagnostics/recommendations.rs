use crate::config::Platform;

/// Always appended when no endpoint answered.
pub const GENERIC_HINTS: &[&str] = &[
    "Check that the backend server is running on port 8000",
    "Check that a firewall is not blocking the backend port",
    "Try restarting the backend server",
];

/// Remediation hints for a platform when nothing is reachable.
///
/// Platform-specific hints come first, followed by [`GENERIC_HINTS`].
pub fn recommendations_for(platform: Platform, is_emulator: bool) -> Vec<String> {
    let specific: &[&str] = match (platform, is_emulator) {
        (Platform::Android, true) => &[
            "Android emulator: the host machine is reachable at 10.0.2.2, not localhost",
            "Make sure the backend listens on 0.0.0.0 rather than 127.0.0.1",
            "Cold-booting the emulator can fix a stale network stack",
        ],
        (Platform::Android, false) => &[
            "Physical Android device: connect to the same Wi-Fi network as the backend machine",
            "Use the backend machine's LAN address (e.g. 192.168.1.100) in the endpoint table",
            "Allow cleartext HTTP for the backend host if it is not served over HTTPS",
        ],
        (Platform::Ios, true) => &[
            "iOS simulator: localhost reaches the host machine directly",
            "Make sure the backend is running on the same Mac as the simulator",
        ],
        (Platform::Ios, false) => &[
            "Physical iOS device: connect to the same Wi-Fi network as the backend machine",
            "Use the backend machine's LAN address in the endpoint table",
            "Add an App Transport Security exception if the backend is not served over HTTPS",
        ],
        (Platform::Web, _) => &[
            "Browser: check that the backend allows this origin (CORS)",
            "Mixed content is blocked: an HTTPS page cannot call an HTTP backend",
        ],
        (Platform::Desktop, _) => &[
            "Desktop: check that the backend is listening on localhost port 8000",
            "If localhost fails, try 127.0.0.1 in case localhost resolves to IPv6 only",
        ],
    };

    specific
        .iter()
        .chain(GENERIC_HINTS)
        .map(|hint| hint.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_android_emulator_mentions_host_alias() {
        let hints = recommendations_for(Platform::Android, true);
        assert!(hints[0].contains("10.0.2.2"));
    }

    #[test]
    fn test_generic_hints_follow_platform_hints() {
        for platform in [Platform::Android, Platform::Ios, Platform::Web, Platform::Desktop] {
            for is_emulator in [true, false] {
                let hints = recommendations_for(platform, is_emulator);
                let tail = &hints[hints.len() - GENERIC_HINTS.len()..];
                assert_eq!(tail, GENERIC_HINTS);
                assert!(hints.len() > GENERIC_HINTS.len());
            }
        }
    }

    #[test]
    fn test_desktop_asks_for_a_listening_backend() {
        let hints = recommendations_for(Platform::Desktop, false);
        assert!(hints[0].contains("listening on localhost port 8000"));
    }

    #[test]
    fn test_device_and_emulator_differ() {
        assert_ne!(
            recommendations_for(Platform::Ios, true),
            recommendations_for(Platform::Ios, false)
        );
    }
}
