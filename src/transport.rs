// HTTP transport layer
// The single seam between the authenticated client and the network

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Sends a fully built request and returns the raw response
///
/// Implementations never interpret status codes; a 401 is an `Ok` response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Outbound request description
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,

    /// Path relative to the API base URL (e.g. `/api/students/`)
    pub path: String,

    pub body: Option<Value>,
    pub headers: HeaderMap,

    /// Set once the request has been through a refresh-and-resend cycle
    pub(crate) retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a JSON body
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Merge extra headers into the request (later values win)
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers.iter() {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    /// Whether the request already went through a refresh cycle
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Bearer token currently attached, if any
    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    pub(crate) fn set_bearer(&mut self, token: &str) -> Result<()> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ClientError::InvalidRequest(format!("Invalid access token: {}", e)))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Fully buffered response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Build a response carrying a JSON body
    pub fn json_body(status: StatusCode, body: &Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self::new(status, headers, body.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            ClientError::Decode(format!(
                "Failed to parse response body (status {}): {}",
                self.status, e
            ))
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Best human-readable message for an error response
    ///
    /// Looks at the usual DRF keys (`detail`, `error`, `message`) before
    /// falling back to the raw body and finally the status reason.
    pub fn error_message(&self) -> String {
        if let Ok(json) = serde_json::from_slice::<Value>(&self.body) {
            for key in ["detail", "error", "message"] {
                if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                    return msg.to_string();
                }
            }
            if json.is_object() || json.is_array() {
                return json.to_string();
            }
        }

        let text = self.text();
        let text = text.trim();
        if !text.is_empty() {
            return text.to_string();
        }

        self.status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    }

    /// Turn a non-success response into `ClientError::Api`
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Api {
                status: self.status.as_u16(),
                message: self.error_message(),
            })
        }
    }
}

/// Transport backed by a pooled `reqwest::Client`
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport for the given API base URL
    pub fn new(
        base_url: &str,
        max_connections: usize,
        connect_timeout: u64,
        request_timeout: u64,
    ) -> anyhow::Result<Self> {
        Url::parse(base_url).with_context(|| format!("Invalid API base URL: {}", base_url))?;

        let client = Client::builder()
            .pool_max_idle_per_host(max_connections)
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a request path against the base URL
    ///
    /// Absolute URLs are used as-is; everything else is appended so a base
    /// URL with a path prefix keeps it.
    fn url_for(&self, path: &str) -> Result<Url> {
        let raw = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };

        Url::parse(&raw).map_err(|e| ClientError::InvalidRequest(format!("{}: {}", raw, e)))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let ApiRequest {
            method,
            path,
            body,
            headers,
            ..
        } = request;
        let url = self.url_for(&path)?;

        tracing::debug!(method = %method, url = %url, "Sending HTTP request");

        let mut builder = self.client.request(method, url.clone()).headers(headers);
        if let Some(ref body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| network_error(&e, &url))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| network_error(&e, &url))?;

        tracing::debug!(status = %status, bytes = body.len(), "Received HTTP response");

        Ok(ApiResponse::new(status, headers, body))
    }
}

/// Categorize a reqwest failure for logs and error messages
fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection_failed"
    } else if e.is_request() {
        "request_error"
    } else if e.is_body() {
        "body_error"
    } else if e.is_decode() {
        "decode_error"
    } else {
        "unknown"
    }
}

fn network_error(e: &reqwest::Error, url: &Url) -> ClientError {
    let kind = error_kind(e);
    tracing::warn!(
        error_kind = kind,
        error = %e,
        url = %url,
        "HTTP request error"
    );
    ClientError::Network(format!("{} (kind: {})", e, kind))
}
