use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::types::{NetError, Result, socketio};
use async_trait::async_trait;
use url::Url;

/// Production [`HttpTransport`] backed by a shared `reqwest::Client`.
///
/// Deadlines are enforced by [`TimeoutFetch`](crate::http::TimeoutFetch), not
/// by the client, so a single transport serves every platform profile.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.request(request.method, request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

/// Converts an HTTP base URL into the Socket.IO websocket endpoint under it.
pub fn http_to_ws_endpoint(base: &Url) -> Result<Url> {
    let scheme = match base.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(NetError::Config(format!(
                "cannot derive a websocket URL from scheme '{}'",
                other
            )));
        }
    };

    let mut url = Url::parse(&format!(
        "{}/{}/",
        base.as_str().trim_end_matches('/'),
        socketio::PATH
    ))?;
    url.set_scheme(scheme)
        .map_err(|_| NetError::Config(format!("cannot switch {} to {}", base, scheme)))?;
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("EIO", socketio::ENGINE_VERSION)
        .append_pair("transport", socketio::TRANSPORT_WEBSOCKET);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_to_ws_endpoint() {
        let url = http_to_ws_endpoint(&Url::parse("http://10.0.2.2:8000").unwrap()).unwrap();
        assert_eq!(
            url.as_str(),
            "ws://10.0.2.2:8000/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[tokio::test]
    async fn test_refused_connection_surfaces_as_client_error() {
        let transport = ReqwestTransport::new();
        let request = HttpRequest {
            method: reqwest::Method::GET,
            url: Url::parse("http://127.0.0.1:1/health").unwrap(),
            headers: Vec::new(),
            body: None,
        };

        match transport.send(request).await {
            Err(NetError::Client(e)) => assert!(e.is_connect()),
            other => panic!("expected a client error, got {:?}", other.map(|r| r.status)),
        }
    }

    #[test]
    fn test_https_becomes_wss_and_keeps_prefix() {
        let url =
            http_to_ws_endpoint(&Url::parse("https://chat.example.com/backend/").unwrap()).unwrap();
        assert_eq!(
            url.as_str(),
            "wss://chat.example.com/backend/socket.io/?EIO=4&transport=websocket"
        );
    }
}
