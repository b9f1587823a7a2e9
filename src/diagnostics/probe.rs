use super::recommendations_for;
use crate::config::{Endpoint, EndpointTable};
use crate::http::{RequestOptions, RequestOutcome, RequestRouter, TimeoutFetch};
use crate::types::paths;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Result of probing one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub url: String,
    pub outcome: RequestOutcome,
    pub elapsed: Duration,
}

/// What a connectivity check found.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticReport {
    pub is_connected: bool,
    /// First endpoint, in table order, whose health check succeeded
    pub working_url: Option<String>,
    /// One entry per endpoint, in table order
    pub results: Vec<ProbeResult>,
    /// `"<url>: <reason>"` for every endpoint that did not succeed
    pub errors: Vec<String>,
    /// Remediation hints; empty when an endpoint is reachable
    pub recommendations: Vec<String>,
}

/// Read-only connectivity check.
///
/// Probes the health path on every endpoint with the platform's request
/// timeout and reports all of them. Shares the router's fetch primitive
/// but never reads or writes its working-URL cache.
#[derive(Clone)]
pub struct DiagnosticProbe {
    fetch: TimeoutFetch,
    endpoints: Arc<EndpointTable>,
}

impl DiagnosticProbe {
    pub fn new(fetch: TimeoutFetch, endpoints: Arc<EndpointTable>) -> Self {
        Self { fetch, endpoints }
    }

    pub fn from_router(router: &RequestRouter) -> Self {
        Self::new(router.fetch().clone(), Arc::clone(router.endpoints()))
    }

    pub async fn diagnose(&self) -> DiagnosticReport {
        tracing::info!(
            "Running connectivity diagnostics across {} endpoints",
            self.endpoints.len()
        );

        let mut results = Vec::with_capacity(self.endpoints.len());
        for endpoint in self.endpoints.iter() {
            results.push(self.probe(endpoint).await);
        }

        let working_url = results
            .iter()
            .find(|r| matches!(r.outcome, RequestOutcome::Success { .. }))
            .map(|r| r.url.clone());

        let errors: Vec<String> = results
            .iter()
            .filter(|r| !matches!(r.outcome, RequestOutcome::Success { .. }))
            .map(|r| format!("{}: {}", r.url, r.outcome.describe()))
            .collect();

        let recommendations = if working_url.is_some() {
            Vec::new()
        } else {
            let profile = self.fetch.profile();
            recommendations_for(profile.platform, profile.is_emulator)
        };

        match &working_url {
            Some(url) => tracing::info!("Diagnostics: backend reachable at {}", url),
            None => tracing::warn!("Diagnostics: no endpoint reachable"),
        }

        DiagnosticReport {
            is_connected: working_url.is_some(),
            working_url,
            results,
            errors,
            recommendations,
        }
    }

    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let started = Instant::now();
        let outcome = match self
            .fetch
            .execute(
                endpoint,
                paths::HEALTH,
                &RequestOptions::get(),
                self.fetch.default_timeout(),
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => RequestOutcome::NetworkError {
                message: e.to_string(),
            },
        };
        let elapsed = started.elapsed();

        tracing::debug!(
            "Probe {} -> {} in {}ms",
            endpoint,
            outcome.describe(),
            elapsed.as_millis()
        );
        ProbeResult {
            url: endpoint.to_string(),
            outcome,
            elapsed,
        }
    }
}
