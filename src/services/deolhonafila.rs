//! Client for São Paulo's De Olho na Fila queue feed
//!
//! Each fetch is a single POST with a fixed form body; the upstream answers
//! with a dump of every vaccination point it knows about.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Method, StatusCode,
};

use crate::{
    error::{FetchError, TransportError},
    models::QueueUnit,
    services::{
        context::FetchContext,
        transport::{HttpTransport, UpstreamRequest},
        UnitSource,
    },
};

pub const DEFAULT_UPSTREAM_URL: &str =
    "https://deolhonafila.prefeitura.sp.gov.br/processadores/dados.php";

/// Header value for www form encoded content
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const BODY_KEY: &str = "dados";
const BODY_VALUE: &str = "dados";

#[derive(Clone)]
pub struct DeOlhoNaFilaClient {
    transport: Arc<dyn HttpTransport>,
    url: String,
}

impl DeOlhoNaFilaClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_url(transport, DEFAULT_UPSTREAM_URL)
    }

    pub fn with_url(transport: Arc<dyn HttpTransport>, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
        }
    }

    fn build_request(&self) -> UpstreamRequest {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));

        UpstreamRequest {
            method: Method::POST,
            url: self.url.clone(),
            headers,
            body: format!("{}={}", BODY_KEY, BODY_VALUE).into_bytes(),
        }
    }

    /// Fetch every unit published upstream, in upstream order.
    ///
    /// Makes exactly one attempt. Cancelling `ctx` drops the in-flight request.
    pub async fn fetch(&self, ctx: &FetchContext) -> Result<Vec<QueueUnit>, FetchError> {
        if ctx.is_cancelled() {
            return Err(TransportError::Cancelled.into());
        }

        tracing::info!("Fetching units from {}", self.url);
        let request = self.build_request();

        let response = tokio::select! {
            biased;
            err = ctx.done() => {
                tracing::warn!("Upstream fetch aborted: {}", err);
                return Err(err.into());
            }
            response = self.transport.send(request) => response?,
        };

        if response.status != StatusCode::OK {
            tracing::warn!("Upstream returned status {}", response.status);
            return Err(FetchError::UpstreamStatus(response.status));
        }

        let body = response.body.ok_or(FetchError::EmptyBody)?;

        let units: Vec<QueueUnit> = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!("Error decoding upstream payload: {}", String::from_utf8_lossy(&body));
            FetchError::Decode(e)
        })?;

        tracing::info!("Fetched {} units", units.len());
        Ok(units)
    }
}

#[async_trait]
impl UnitSource for DeOlhoNaFilaClient {
    async fn fetch(&self, ctx: &FetchContext) -> Result<Vec<QueueUnit>, FetchError> {
        DeOlhoNaFilaClient::fetch(self, ctx).await
    }
}
