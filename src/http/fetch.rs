use crate::config::{Endpoint, PlatformProfile};
use crate::types::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A fully resolved HTTP request handed to an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Raw response as seen by the transport; the body is left unparsed.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one HTTP request. Any `Err` is treated as a connectivity failure.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Per-call request options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub bearer_token: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
            bearer_token: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Default::default()
        }
    }

    pub fn put(body: Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
            ..Default::default()
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

/// Classified result of one HTTP attempt against one base URL.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// 2xx/3xx response
    Success { status: u16, body: Value },
    /// Endpoint reachable, any other status
    HttpError { status: u16, body: Value },
    /// Request failed before a response arrived
    NetworkError { message: String },
    /// Deadline fired first; the in-flight request was dropped
    Timeout,
}

impl RequestOutcome {
    /// Whether the endpoint answered at all. Only unreachable outcomes make
    /// the router move on to the next endpoint.
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::HttpError { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. } | Self::HttpError { status, .. } => Some(*status),
            Self::NetworkError { .. } | Self::Timeout => None,
        }
    }

    /// Short human-readable description for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            Self::Success { status, .. } => format!("HTTP {}", status),
            Self::HttpError { status, .. } => format!("HTTP {}", status),
            Self::NetworkError { message } => message.clone(),
            Self::Timeout => "timed out".to_string(),
        }
    }
}

/// Single-request executor with a hard deadline and platform-tuned headers.
///
/// Has no shared state of its own; retries and fallback belong to
/// [`RequestRouter`](super::RequestRouter).
#[derive(Clone)]
pub struct TimeoutFetch {
    transport: Arc<dyn HttpTransport>,
    profile: PlatformProfile,
}

impl TimeoutFetch {
    pub fn new(transport: Arc<dyn HttpTransport>, profile: PlatformProfile) -> Self {
        Self { transport, profile }
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    /// Default deadline for this platform.
    pub fn default_timeout(&self) -> Duration {
        self.profile.request_timeout
    }

    /// Issues one request against `endpoint` and classifies the result.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::UrlParse`](crate::NetError::UrlParse) when `path`
    /// does not form a valid URL with the base. No request is sent then.
    pub async fn execute(
        &self,
        endpoint: &Endpoint,
        path: &str,
        options: &RequestOptions,
        timeout: Duration,
    ) -> Result<RequestOutcome> {
        let url = endpoint.join(path)?;
        let request = HttpRequest {
            method: options.method.clone(),
            url,
            headers: self.headers_for(options),
            body: options.body.clone(),
        };

        tracing::debug!(
            "{} {} (timeout {}ms)",
            request.method,
            request.url,
            timeout.as_millis()
        );

        let outcome = match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Err(_) => RequestOutcome::Timeout,
            Ok(Err(e)) => RequestOutcome::NetworkError {
                message: e.to_string(),
            },
            Ok(Ok(response)) => classify(response),
        };

        Ok(outcome)
    }

    fn headers_for(&self, options: &RequestOptions) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        for (key, value) in self.profile.extra_headers() {
            headers.push((key.to_string(), value.to_string()));
        }
        headers.extend(options.headers.iter().cloned());
        if let Some(token) = &options.bearer_token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        headers
    }
}

fn classify(response: HttpResponse) -> RequestOutcome {
    let body = serde_json::from_str::<Value>(&response.body).unwrap_or_else(|_| {
        if !response.body.is_empty() {
            tracing::debug!("Response body is not JSON, using empty object");
        }
        Value::Object(Default::default())
    });

    if (200..400).contains(&response.status) {
        RequestOutcome::Success {
            status: response.status,
            body,
        }
    } else {
        RequestOutcome::HttpError {
            status: response.status,
            body,
        }
    }
}
