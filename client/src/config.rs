use crate::error::ClientError;
use clap::{ArgAction, Args};
use std::time::Duration;
use vecstore_types::{DEFAULT_DATABASE, DEFAULT_TENANT};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server host, optionally with an http:// or https:// scheme
    #[arg(long, default_value_t = String::from("localhost"))]
    pub host: String,

    /// Server http port
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Use https when the host carries no scheme
    #[arg(long, default_value_t = false, action=ArgAction::SetTrue)]
    pub ssl_enabled: bool,

    /// API version prefix appended to every path
    #[arg(long, default_value_t = String::from("/api/v1"))]
    pub api_path: String,

    /// Tenant used by operations that are not given one
    #[arg(long, default_value_t = String::from(DEFAULT_TENANT))]
    pub tenant: String,

    /// Database used by operations that are not given one
    #[arg(long, default_value_t = String::from(DEFAULT_DATABASE))]
    pub database: String,

    /// Per request timeout in milliseconds. Requests are unbounded when unset
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: 8000,
            ssl_enabled: false,
            api_path: String::from("/api/v1"),
            tenant: String::from(DEFAULT_TENANT),
            database: String::from(DEFAULT_DATABASE),
            request_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn ssl_enabled(mut self, ssl_enabled: bool) -> Self {
        self.ssl_enabled = ssl_enabled;
        self
    }

    pub fn api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn request_timeout_ms(mut self, timeout: u64) -> Self {
        self.request_timeout_ms = Some(timeout);
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Base URL every request path is appended to, e.g. `http://localhost:8000/api/v1`
    pub fn resolve_url(&self) -> Result<String, ClientError> {
        let host = self.host.trim();
        let (scheme, authority) = if let Some(rest) = host.strip_prefix("https://") {
            ("https", rest)
        } else if let Some(rest) = host.strip_prefix("http://") {
            ("http", rest)
        } else if self.ssl_enabled {
            ("https", host)
        } else {
            ("http", host)
        };
        let authority = authority.trim_end_matches('/');
        if authority.is_empty() || authority.contains('/') {
            return Err(ClientError::InvalidUrl(self.host.clone()));
        }
        let authority = if has_port(authority) {
            authority.to_string()
        } else {
            format!("{authority}:{}", self.port)
        };
        let api_path = self.api_path.trim().trim_matches('/');
        if api_path.is_empty() {
            Ok(format!("{scheme}://{authority}"))
        } else {
            Ok(format!("{scheme}://{authority}/{api_path}"))
        }
    }
}

fn has_port(authority: &str) -> bool {
    // bracketed ipv6 literals carry colons of their own
    let host_end = authority.rfind(']').unwrap_or(0);
    authority[host_end..]
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
}
