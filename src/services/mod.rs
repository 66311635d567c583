//! Upstream access services

pub mod context;
pub mod deolhonafila;
pub mod transport;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::UpstreamConfig,
    error::{AppError, AppResult, FetchError},
    models::QueueUnit,
};

pub use context::{CancelHandle, FetchContext};
pub use deolhonafila::DeOlhoNaFilaClient;
pub use transport::{HttpTransport, ReqwestTransport, UpstreamRequest, UpstreamResponse};

/// Anything able to produce the current list of queue units
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnitSource: Send + Sync {
    async fn fetch(&self, ctx: &FetchContext) -> Result<Vec<QueueUnit>, FetchError>;
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub units: Arc<dyn UnitSource>,
}

impl Services {
    /// Wire the De Olho na Fila client over a real HTTP transport
    pub fn new(config: &UpstreamConfig) -> AppResult<Self> {
        let transport = ReqwestTransport::new(config)
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        let client = DeOlhoNaFilaClient::with_url(Arc::new(transport), config.url.clone());

        Ok(Self::with_source(Arc::new(client)))
    }

    pub fn with_source(units: Arc<dyn UnitSource>) -> Self {
        Self { units }
    }
}
