use crate::codec::WireCodec;
use crate::error::ClientError;
use crate::transport::{Endpoint, RawResponse, Transport};
use http::{Method, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;

/// Everything except unreserved characters and `/` gets escaped
const PATH_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Placeholder for requests that carry no body
pub const NO_BODY: Option<&()> = None;

pub fn escape_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ESCAPE).to_string()
}

/// Query string parameters. Unset optional values are dropped rather than sent empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Display) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_opt(self, key: &str, value: Option<impl Display>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn into_inner(self) -> Vec<(String, String)> {
        self.0
    }
}

/// Composes endpoints against a base URL and routes the raw exchange through the codec and error
/// classification
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl RequestDispatcher {
    pub fn new(base_url: String, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn endpoint<B>(
        &self,
        method: Method,
        path: &str,
        query: QueryParams,
        body: Option<&B>,
    ) -> Result<Endpoint, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(WireCodec::encode::<B>).transpose()?;
        Ok(Endpoint {
            method,
            url: format!("{}{}", self.base_url, escape_path(path)),
            query: query.into_inner(),
            body,
        })
    }

    pub async fn dispatch<B>(
        &self,
        method: Method,
        path: &str,
        query: QueryParams,
        body: Option<&B>,
    ) -> Result<Value, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let endpoint = self.endpoint(method, path, query, body)?;
        log::debug!("Dispatching {} {}", endpoint.method, endpoint.url);
        let response = self.transport.send(endpoint).await?;
        log::debug!("Received status {} for {path}", response.status);
        classify(response)
    }
}

/// turns a raw exchange into decoded JSON or the error the server reported
pub(crate) fn classify(response: RawResponse) -> Result<Value, ClientError> {
    if response.is_success() {
        return WireCodec::decode(&response.body);
    }
    let (error, message) = remote_message(&response);
    Err(ClientError::Remote {
        status: response.status,
        error,
        message,
    })
}

fn remote_message(response: &RawResponse) -> (Option<String>, String) {
    if let Ok(Value::Object(body)) = WireCodec::decode(&response.body) {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        if let Some(message) = text("message") {
            return (text("error"), message);
        }
        if let Some(message) = text("error").or_else(|| text("detail")) {
            return (None, message);
        }
    }
    let raw = String::from_utf8_lossy(&response.body).trim().to_string();
    if !raw.is_empty() {
        return (None, raw);
    }
    let reason = StatusCode::from_u16(response.status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown status");
    (None, reason.to_string())
}
