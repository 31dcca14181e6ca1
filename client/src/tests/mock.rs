use crate::dispatch::RequestDispatcher;
use crate::error::ClientError;
use crate::transport::{Endpoint, RawResponse, Transport};
use http::Method;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) const MOCK_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Transport that records every endpoint it is handed and answers from a route table. Unrouted
/// requests get a 404
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<(Method, String), RawResponse>>,
    calls: Mutex<Vec<Endpoint>>,
    shutdowns: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(
            (method, path.to_string()),
            RawResponse {
                status,
                body: body.as_bytes().to_vec(),
            },
        );
    }

    pub(crate) fn dispatcher(self: &Arc<Self>) -> RequestDispatcher {
        RequestDispatcher::new(MOCK_BASE_URL.to_string(), Arc::clone(self) as Arc<dyn Transport>)
    }

    pub(crate) fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method && call.path_after(MOCK_BASE_URL) == path)
            .count()
    }

    /// the last request sent to `path`, body decoded
    pub(crate) fn last_body(&self, path: &str) -> Option<serde_json::Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|call| call.path_after(MOCK_BASE_URL) == path)
            .and_then(|call| call.body.as_ref())
            .map(|body| serde_json::from_slice(body).unwrap())
    }

    pub(crate) fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, endpoint: Endpoint) -> Result<RawResponse, ClientError> {
        let key = (
            endpoint.method.clone(),
            endpoint.path_after(MOCK_BASE_URL).to_string(),
        );
        self.calls.lock().unwrap().push(endpoint);
        let routed = self.routes.lock().unwrap().get(&key).cloned();
        Ok(routed.unwrap_or_else(|| RawResponse {
            status: 404,
            body: br#"{"error": "NotFoundError", "message": "no route"}"#.to_vec(),
        }))
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
