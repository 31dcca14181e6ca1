use crate::error::ClientError;
use crate::registry::ConnectionRegistry;
use http::Method;
use std::sync::Arc;

/// A fully composed request, ready to go on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub method: Method,
    /// base URL joined with the already escaped path
    pub url: String,
    pub query: Vec<(String, String)>,
    /// encoded JSON body
    pub body: Option<Vec<u8>>,
}

impl Endpoint {
    /// path portion of the url, useful for matching in tests and logs
    pub fn path_after<'a>(&'a self, base_url: &str) -> &'a str {
        self.url.strip_prefix(base_url).unwrap_or(&self.url)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed exchange, before any classification
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between request dispatch and the network
#[async_trait::async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, endpoint: Endpoint) -> Result<RawResponse, ClientError>;

    /// releases every connection held by the transport
    async fn shutdown(&self);
}

/// reqwest backed transport choosing its pool from a [`ConnectionRegistry`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    registry: Arc<ConnectionRegistry>,
}

impl HttpTransport {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, endpoint: Endpoint) -> Result<RawResponse, ClientError> {
        // acquiring never suspends, only the exchange below does
        let connection = self.registry.acquire_current()?;
        let client = connection.client()?;
        let mut request = client.request(endpoint.method, &endpoint.url);
        if !endpoint.query.is_empty() {
            request = request.query(&endpoint.query);
        }
        if let Some(body) = endpoint.body {
            request = request
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(body);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }

    async fn shutdown(&self) {
        self.registry.shutdown_all().await
    }
}
