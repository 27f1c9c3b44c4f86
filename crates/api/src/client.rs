//! HTTP transport for the TaaS service and the platform API.

use std::time::{Duration, Instant};
use std::{env, io::Write};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Method, header};
use url::Url;
use serde_json::Value;
use tracing::debug;

use crate::config::TaasConfig;
use crate::error::{ApiError, ConfigError, StreamError};
use crate::path::build_path;

/// Hostnames allowed to use plain HTTP.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// The remote service a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// The testing-as-a-service API.
    Taas,
    /// The platform API (apps, hooks, pipelines, addon plans).
    Platform,
}

/// A request relative to a service's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub service: Service,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(service: Service, method: Method, path: impl Into<String>) -> Self {
        Self {
            service,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::GET, path)
    }

    pub fn post(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::POST, path)
    }

    pub fn patch(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::PATCH, path)
    }

    pub fn delete(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Executes JSON requests against the remote services.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the parsed body of a successful response.
    ///
    /// Empty bodies yield `Value::Null`; bodies that are not JSON are returned
    /// as `Value::String`. Non-success statuses become [`ApiError::Remote`].
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError>;

    /// Base URL of `service`, without a trailing slash.
    fn base_url(&self, service: Service) -> &str;
}

/// Streams raw log output for a test or run.
#[async_trait]
pub trait LogStreamer: Send + Sync {
    /// Open the tail endpoint for `id` and copy every received byte to `sink`.
    ///
    /// Returns `Ok(())` when the remote end closes the stream.
    async fn stream_logs(&self, id: &str, sink: &mut (dyn Write + Send)) -> Result<(), StreamError>;
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client`.
///
/// The client pre-configures default headers and builds requests against the
/// validated base URLs of both services.
pub struct TaasClient {
    pub taas_base_url: String,
    pub platform_base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl TaasClient {
    /// Construct a [`TaasClient`] from resolved configuration.
    ///
    /// Only a connect timeout is applied so long-lived log streams are not cut
    /// off.
    pub fn new(config: &TaasConfig) -> Result<Self, ApiError> {
        validate_base_url("TaaS API", &config.taas_base_url)?;
        validate_base_url("platform API", &config.platform_base_url)?;

        let mut default_headers = header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = header::HeaderValue::from_str(&format!("Bearer {token}")).map_err(ApiError::network)?;
            default_headers.insert(header::AUTHORIZATION, value);
        }
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(ApiError::network)?;

        Ok(Self {
            taas_base_url: config.taas_base_url.clone(),
            platform_base_url: config.platform_base_url.clone(),
            http,
            user_agent: format!("taas-cli/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        debug!(%url, %method, "building request");
        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }
}

#[async_trait]
impl Transport for TaasClient {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let start = Instant::now();
        let url = format!("{}{}", self.base_url(request.service), request.path);
        let mut builder = self.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ApiError::network)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::network)?;
        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "http request completed"
        );

        if !status.is_success() {
            return Err(ApiError::Remote {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(parse_body(&text))
    }

    fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Taas => &self.taas_base_url,
            Service::Platform => &self.platform_base_url,
        }
    }
}

#[async_trait]
impl LogStreamer for TaasClient {
    async fn stream_logs(&self, id: &str, sink: &mut (dyn Write + Send)) -> Result<(), StreamError> {
        let path = build_path("/v1/diagnostic/{id}/taillogs", &[("id", id)]);
        let url = format!("{}{}", self.taas_base_url, path);
        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(StreamError::from_reqwest)?;
        // Forwarded whatever the status.
        debug!(status = response.status().as_u16(), %path, "log stream opened");

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(StreamError::from_reqwest)?;
            sink.write_all(&bytes)?;
            sink.flush()?;
        }
        Ok(())
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - the URL must parse and include a host
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(setting: &'static str, base: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        setting,
        value: base.to_string(),
        reason,
    };
    let parsed = Url::parse(base).map_err(|error| invalid(error.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| invalid("URL must include a host".to_string()))?;

    if LOCALHOST_DOMAINS.iter().any(|allowed| host.eq_ignore_ascii_case(allowed)) {
        return Ok(());
    }
    if parsed.scheme() != "https" {
        return Err(invalid(format!(
            "must use https for non-localhost hosts; got '{}://'",
            parsed.scheme()
        )));
    }
    Ok(())
}
