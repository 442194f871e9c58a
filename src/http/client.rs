//! HTTP client capability and its reqwest-backed implementation

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::common::{join_url, Error, Result};

use super::protocol::{HttpRequest, HttpResponse, Method};

/// Anything that can carry a request to the service and bring back a response
///
/// Implementations only return `Err` for transport faults. Any status code,
/// including 4xx and 5xx, is a successful exchange.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Client for the service under test
pub struct ServiceClient {
    inner: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl ServiceClient {
    /// Build a client rooted at `base_url`
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::invalid_base_url(
                base_url,
                "must start with http:// or https://",
            ));
        }

        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))?;

        Ok(Self {
            inner,
            base_url: base_url.to_string(),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpClient for ServiceClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = join_url(&self.base_url, &request.path);
        debug!(method = %request.method, %url, "sending request");

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };

        let mut builder = self.inner.request(method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    url: url.clone(),
                    secs: self.timeout_secs,
                }
            } else {
                Error::transport(request.method.as_str(), &url, e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(request.method.as_str(), &url, e.to_string()))?;

        debug!(%status, bytes = body.len(), "received response");
        trace!(%body, "response body");

        Ok(HttpResponse { status, body })
    }
}
