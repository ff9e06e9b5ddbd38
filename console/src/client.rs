//! Authenticated JSON/text request client
//!
//! Every console feature talks to the backend through [`RequestClient`]. It
//! injects the page's CSRF token, makes exactly one attempt per call, turns
//! non-2xx responses into [`RequestError::Status`] carrying the body text, and
//! decodes the body according to the declared content type.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::page::PageMeta;
use crate::{RequestError, Result};

/// Header carrying the CSRF token
pub const CSRF_HEADER: &str = "x-csrftoken";

/// HTTP methods the console issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// Caller-supplied options for [`RequestClient::fetch_json`]
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    /// Already-serialized body
    pub body: Option<String>,
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    /// POST with a pre-serialized body
    pub fn post<S: Into<String>>(body: S) -> Self {
        Self {
            method: Method::Post,
            body: Some(body.into()),
            headers: HeaderMap::new(),
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A fully assembled request, as handed to the transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the backend base URL, e.g. `/api/status`
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// What the transport got back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn json<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    pub fn text<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            content_type: Some("text/plain; charset=utf-8".to_string()),
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(false, |ct| ct.contains("application/json"))
    }
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// JSON view of the body; text becomes a JSON string
    pub fn into_value(self) -> serde_json::Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => serde_json::Value::String(text),
        }
    }

    /// Compact JSON rendering
    pub fn to_compact(&self) -> String {
        render_json(&self.clone().into_value(), false)
    }

    /// Two-space indented JSON rendering
    pub fn to_pretty(&self) -> String {
        render_json(&self.clone().into_value(), true)
    }
}

pub(crate) fn render_json(value: &serde_json::Value, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    // Serializing a Value cannot fail
    rendered.unwrap_or_default()
}

/// Browser truthiness: null, false, 0, NaN and "" are falsy
pub(crate) fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

/// Something that can carry one request to the backend
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform the request. Only transport-level failures are errors; any
    /// HTTP status is returned as a response.
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, RequestError>;
}

/// Production transport on top of `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport rooted at `base_url`
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { http, base_url })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, RequestError> {
        let url = self
            .base_url
            .join(&request.path)
            .map_err(|e| RequestError::Transport(format!("invalid request path {}: {}", request.path, e)))?;

        let mut builder = self
            .http
            .request(request.method.into(), url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Request counters, for diagnostics only
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Exponential moving average of round-trip time
    pub avg_response_time_ms: f64,
    pub last_request: Option<chrono::DateTime<chrono::Utc>>,
}

impl RequestStats {
    fn record(&mut self, success: bool, response_time_ms: f64) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
        self.last_request = Some(chrono::Utc::now());

        let alpha = 0.1;
        self.avg_response_time_ms = if self.total_requests == 1 {
            response_time_ms
        } else {
            alpha * response_time_ms + (1.0 - alpha) * self.avg_response_time_ms
        };
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests > 0 {
            self.successful_requests as f64 / self.total_requests as f64
        } else {
            0.0
        }
    }
}

/// Shared request client; cheap to clone
#[derive(Clone)]
pub struct RequestClient {
    transport: Arc<dyn HttpTransport>,
    meta: Arc<PageMeta>,
    stats: Arc<RwLock<RequestStats>>,
}

impl RequestClient {
    pub fn new(transport: Arc<dyn HttpTransport>, meta: PageMeta) -> Self {
        Self {
            transport,
            meta: Arc::new(meta),
            stats: Arc::new(RwLock::new(RequestStats::default())),
        }
    }

    /// Issue one request and decode the answer
    pub async fn fetch_json(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> std::result::Result<ResponseBody, RequestError> {
        let request = self.build_request(path, options)?;
        let method = request.method;

        let started = Instant::now();
        let outcome = self.execute(request).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.stats.write().await.record(outcome.is_ok(), elapsed_ms);

        match &outcome {
            Ok(_) => debug!(method = method.as_str(), path, elapsed_ms, "Request completed"),
            Err(e) => warn!(
                method = method.as_str(),
                path,
                status = ?e.status(),
                category = e.category(),
                "Request failed"
            ),
        }

        outcome
    }

    /// GET `path`
    pub async fn get(&self, path: &str) -> std::result::Result<ResponseBody, RequestError> {
        self.fetch_json(path, RequestOptions::get()).await
    }

    /// POST a pre-serialized body to `path`
    pub async fn post(&self, path: &str, body: String) -> std::result::Result<ResponseBody, RequestError> {
        self.fetch_json(path, RequestOptions::post(body)).await
    }

    pub async fn stats(&self) -> RequestStats {
        self.stats.read().await.clone()
    }

    /// Merge headers: default content type, then caller headers, then the token
    pub fn build_request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> std::result::Result<HttpRequest, RequestError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        headers.extend(options.headers);

        if let Some(token) = self.meta.csrf_token() {
            let value = HeaderValue::from_str(token).map_err(|_| RequestError::InvalidHeader {
                name: CSRF_HEADER.to_string(),
            })?;
            headers.insert(HeaderName::from_static(CSRF_HEADER), value);
        }

        Ok(HttpRequest {
            method: options.method,
            path: path.to_string(),
            headers,
            body: options.body,
        })
    }

    async fn execute(&self, request: HttpRequest) -> std::result::Result<ResponseBody, RequestError> {
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(RequestError::Status {
                status: response.status,
                body: response.body,
            });
        }

        if response.is_json() {
            serde_json::from_str(&response.body)
                .map(ResponseBody::Json)
                .map_err(|e| RequestError::Decode(e.to_string()))
        } else {
            Ok(ResponseBody::Text(response.body))
        }
    }
}

impl std::fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestClient")
            .field("csrf_token", &self.meta.csrf_token().is_some())
            .finish()
    }
}
