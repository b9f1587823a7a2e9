//! "Test connection" action: probes every endpoint, logs in, and opens the
//! realtime channel for a few seconds.
//!
//! Reads `CHATLINK_BASE_URLS` (comma separated) and `CHATLINK_PLATFORM`
//! from the environment or a `.env` file.

use chatlink::{ChatNetwork, EventKind, LoginRequest, NetworkConfig, Platform};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let platform = match std::env::var("CHATLINK_PLATFORM").as_deref() {
        Ok("android") => Platform::Android,
        Ok("ios") => Platform::Ios,
        Ok("web") => Platform::Web,
        _ => Platform::Desktop,
    };
    let emulator = std::env::var("CHATLINK_EMULATOR").is_ok_and(|v| v == "1");

    let mut config = NetworkConfig::for_platform(platform, emulator);
    if let Ok(urls) = std::env::var("CHATLINK_BASE_URLS") {
        config.base_urls = urls.split(',').map(|u| u.trim().to_string()).collect();
    }

    let network = ChatNetwork::new(config)?;

    println!("Probing {} endpoints...", network.endpoints().len());
    let report = network.diagnostics().diagnose().await;
    for result in &report.results {
        println!(
            "  {:<32} {:<28} {}ms",
            result.url,
            result.outcome.describe(),
            result.elapsed.as_millis()
        );
    }
    match &report.working_url {
        Some(url) => println!("Backend reachable at {}\n", url),
        None => {
            println!("Backend unreachable. Things to try:");
            for hint in &report.recommendations {
                println!("  - {}", hint);
            }
            println!();
        }
    }

    let login = network
        .api()
        .login(&LoginRequest {
            username: "demo".to_string(),
            password: "demo".to_string(),
        })
        .await?;
    println!(
        "Login: status {} (offline: {}, tried {} endpoints)",
        login.status, login.offline, login.attempts
    );

    let realtime = network.realtime();
    realtime.on(EventKind::ChatMessage, |event| println!("<- {:?}", event));
    realtime.on(EventKind::Error, |event| println!("!! {:?}", event));

    match realtime.connect("demo", None).await {
        Ok(()) => {
            println!("Realtime connected to {:?}", realtime.current_endpoint().await);
            realtime.send_chat_message("ping from connection_check", None).await?;
            tokio::time::sleep(Duration::from_secs(3)).await;
            realtime.disconnect().await?;
        }
        Err(e) => println!("Realtime unavailable: {}", e),
    }

    Ok(())
}
