use crate::types::{NetError, Result};
use url::Url;

/// One candidate base URL for reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: Url,
    pub is_primary: bool,
}

impl Endpoint {
    /// Absolute URL for `path` under this base. `path` must start with `/`.
    ///
    /// Any path prefix on the base is preserved, unlike `Url::join` with an
    /// absolute path.
    pub fn join(&self, path: &str) -> Result<Url> {
        if !path.starts_with('/') {
            return Err(url::ParseError::RelativeUrlWithoutBase.into());
        }
        let base = self.url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path))?)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url.as_str().trim_end_matches('/'))
    }
}

/// Ordered, immutable list of candidate base URLs: primary first, then
/// fallbacks in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTable {
    endpoints: Vec<Endpoint>,
}

impl EndpointTable {
    /// Builds the table from base URLs in priority order. The first entry is
    /// the primary. Duplicate URLs keep their first position.
    pub fn new<I, S>(urls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut endpoints: Vec<Endpoint> = Vec::new();
        for raw in urls {
            let url = Url::parse(raw.as_ref().trim())?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(NetError::Config(format!(
                    "endpoint '{}' must use http or https",
                    url
                )));
            }
            if endpoints.iter().any(|e| e.url == url) {
                continue;
            }
            let is_primary = endpoints.is_empty();
            endpoints.push(Endpoint { url, is_primary });
        }

        if endpoints.is_empty() {
            return Err(NetError::Config(
                "endpoint table needs at least one base URL".to_string(),
            ));
        }

        Ok(Self { endpoints })
    }

    pub fn primary(&self) -> &Endpoint {
        &self.endpoints[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Candidate order for one request: `preferred` first (when set), then
    /// the table order, without duplicates.
    pub fn candidates(&self, preferred: Option<&Endpoint>) -> Vec<Endpoint> {
        let mut order = Vec::with_capacity(self.endpoints.len() + 1);
        if let Some(preferred) = preferred {
            order.push(preferred.clone());
        }
        for endpoint in &self.endpoints {
            if !order.iter().any(|e: &Endpoint| e.url == endpoint.url) {
                order.push(endpoint.clone());
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EndpointTable {
        EndpointTable::new([
            "http://10.0.2.2:8000",
            "http://localhost:8000",
            "http://127.0.0.1:8000",
        ])
        .unwrap()
    }

    #[test]
    fn test_first_url_is_primary() {
        let table = table();
        assert!(table.primary().is_primary);
        assert_eq!(table.iter().filter(|e| e.is_primary).count(), 1);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_rejects_empty_table() {
        let urls: [&str; 0] = [];
        assert!(matches!(EndpointTable::new(urls), Err(NetError::Config(_))));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            EndpointTable::new(["ftp://example.com"]),
            Err(NetError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_url() {
        assert!(matches!(
            EndpointTable::new(["not a url"]),
            Err(NetError::UrlParse(_))
        ));
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let table = EndpointTable::new([
            "http://localhost:8000",
            "http://127.0.0.1:8000",
            "http://localhost:8000",
        ])
        .unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_candidates_prefer_cached_then_table_order() {
        let table = table();
        let cached = table.iter().nth(2).cloned().unwrap();
        let order = table.candidates(Some(&cached));

        let urls: Vec<String> = order.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            urls,
            vec![
                "http://127.0.0.1:8000",
                "http://10.0.2.2:8000",
                "http://localhost:8000"
            ]
        );
    }

    #[test]
    fn test_candidates_without_cache_match_table() {
        let table = table();
        let order = table.candidates(None);
        assert_eq!(order, table.iter().cloned().collect::<Vec<_>>());
    }

    #[test]
    fn test_join_keeps_base_prefix() {
        let endpoint = EndpointTable::new(["https://example.com/backend/"])
            .unwrap()
            .primary()
            .clone();
        assert_eq!(
            endpoint.join("/api/auth/login").unwrap().as_str(),
            "https://example.com/backend/api/auth/login"
        );
        assert!(matches!(
            endpoint.join("health"),
            Err(NetError::UrlParse(_))
        ));
    }
}
