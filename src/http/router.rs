use super::offline::offline_substitute;
use super::{RequestOptions, RequestOutcome, TimeoutFetch};
use crate::config::{Endpoint, EndpointTable};
use crate::types::{NetError, Result};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Caller-facing result of a routed request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Response body on success (or the offline substitute)
    pub data: Option<Value>,
    /// Error message for HTTP errors and exhaustion
    pub error: Option<String>,
    /// HTTP status, `0` when no endpoint could be reached
    pub status: u16,
    /// `true` when `data` is a canned offline payload
    pub offline: bool,
    /// Number of endpoints tried
    pub attempts: usize,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Converts into a `Result`, for callers that prefer `?`.
    ///
    /// # Errors
    ///
    /// [`NetError::Http`] when the endpoint answered with an error status,
    /// [`NetError::Exhausted`] when nothing could be reached.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            None => Ok(self.data.unwrap_or(Value::Null)),
            Some(message) if self.status == 0 => Err(NetError::Exhausted {
                attempts: self.attempts,
                last_error: message,
            }),
            Some(message) => Err(NetError::Http {
                status: self.status,
                message,
            }),
        }
    }
}

/// Tries the endpoint table in order until one endpoint answers.
///
/// The last endpoint that returned a successful response is cached and tried
/// first on the next call. Fallback is strictly sequential: at most one
/// request per `request` call is in flight. Separate calls are independent
/// and may run concurrently.
#[derive(Clone)]
pub struct RequestRouter {
    fetch: TimeoutFetch,
    endpoints: Arc<EndpointTable>,
    working_url: Arc<RwLock<Option<Endpoint>>>,
}

impl RequestRouter {
    pub fn new(fetch: TimeoutFetch, endpoints: Arc<EndpointTable>) -> Self {
        Self {
            fetch,
            endpoints,
            working_url: Arc::new(RwLock::new(None)),
        }
    }

    pub fn fetch(&self) -> &TimeoutFetch {
        &self.fetch
    }

    pub fn endpoints(&self) -> &Arc<EndpointTable> {
        &self.endpoints
    }

    /// Endpoint that most recently returned a successful response.
    pub async fn working_url(&self) -> Option<Endpoint> {
        self.working_url.read().await.clone()
    }

    /// Sends `path` to the first reachable endpoint.
    ///
    /// Success and HTTP errors both end the search. Only successes update
    /// the working-URL cache, so an endpoint that is up but failing does not
    /// jump ahead of the primary. Timeouts and network errors move on to the
    /// next candidate. When every candidate is unreachable the offline
    /// substitute for `path` is returned if one exists, otherwise an error
    /// response with status `0`.
    ///
    /// # Errors
    ///
    /// Only caller errors: a `path` that does not form a valid URL.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
        let preferred = self.working_url().await;
        let candidates = self.endpoints.candidates(preferred.as_ref());
        let timeout = self.fetch.default_timeout();

        let mut last_error = String::from("no endpoints configured");
        for (index, endpoint) in candidates.iter().enumerate() {
            let attempts = index + 1;
            match self.fetch.execute(endpoint, path, &options, timeout).await? {
                RequestOutcome::Success { status, body } => {
                    if preferred.as_ref() != Some(endpoint) {
                        tracing::info!("Working URL is now {}", endpoint);
                    }
                    *self.working_url.write().await = Some(endpoint.clone());
                    return Ok(ApiResponse {
                        data: Some(body),
                        error: None,
                        status,
                        offline: false,
                        attempts,
                    });
                }
                RequestOutcome::HttpError { status, body } => {
                    tracing::debug!("{} {} answered HTTP {}", endpoint, path, status);
                    return Ok(ApiResponse {
                        data: None,
                        error: Some(error_message(status, &body)),
                        status,
                        offline: false,
                        attempts,
                    });
                }
                outcome @ (RequestOutcome::NetworkError { .. } | RequestOutcome::Timeout) => {
                    last_error = format!("{}: {}", endpoint, outcome.describe());
                    tracing::warn!("Endpoint unreachable, falling back ({})", last_error);
                }
            }
        }

        let attempts = candidates.len();
        if let Some(payload) = offline_substitute(path, &options) {
            tracing::warn!(
                "All {} endpoints unreachable, serving offline payload for {}",
                attempts,
                path
            );
            return Ok(ApiResponse {
                data: Some(payload),
                error: None,
                status: 200,
                offline: true,
                attempts,
            });
        }

        tracing::error!("All {} endpoints unreachable for {}", attempts, path);
        Ok(ApiResponse {
            data: None,
            error: Some(format!(
                "Unable to reach the server after trying {} endpoints (last error: {})",
                attempts, last_error
            )),
            status: 0,
            offline: false,
            attempts,
        })
    }
}

/// `detail` from the error body (FastAPI style), else `message`, else the status.
fn error_message(status: u16, body: &Value) -> String {
    match body.get("detail").or_else(|| body.get("message")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => format!("HTTP {}", status),
        Some(other) => other.to_string(),
    }
}
