//! Onde 2a Dose
//!
//! Relays São Paulo's De Olho na Fila vaccination queue feed as JSON, either
//! verbatim or with every textual field converted to its typed value.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult, FetchError, TransportError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
