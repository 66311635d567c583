//! HTTP transport used to reach the upstream feed
//!
//! The fetcher only talks to [`HttpTransport`], so tests can script responses
//! without a network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, redirect::Policy, Method, StatusCode};

use crate::{config::UpstreamConfig, error::TransportError};

/// Outgoing request, fully buffered
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Response as seen by the fetcher. `body` is `None` when no body was
/// delivered at all, which is different from an empty one.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Capability to perform one HTTP exchange
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError>;
}

/// [`HttpTransport`] backed by a component-owned `reqwest::Client`
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a dedicated client: redirects are returned as-is, never followed
    pub fn new(config: &UpstreamConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let response = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        // Drain the body before handing back so the connection is released
        // whatever the caller decides about the status.
        let body = response.bytes().await?;

        tracing::debug!("Upstream answered {} with {} bytes", status, body.len());

        Ok(UpstreamResponse {
            status,
            headers,
            body: Some(body.to_vec()),
        })
    }
}
