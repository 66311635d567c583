//! Stand-in for the De Olho na Fila endpoint, for local development
//!
//! Serves a fixed dump at `POST /processadores/dados.php`. Run the relay with
//! `RUN_MODE=local` to point it here.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{http::header::CONTENT_TYPE, routing::post, Router};
use tower_http::trace::TraceLayer;

const DEFAULT_PORT: u16 = 8082;

static STUB: &str = include_str!("../../fixtures/deolhonafila.json");

async fn dados() -> ([(axum::http::HeaderName, &'static str); 1], &'static str) {
    tracing::info!("request dados");
    ([(CONTENT_TYPE, "application/json; charset=UTF-8")], STUB)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fake_deolhonafila=info,tower_http=debug".into()),
        )
        .init();

    let port = match std::env::var("PORT") {
        Ok(port) => port.parse().context("Invalid PORT")?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let app = Router::new()
        .route("/processadores/dados.php", post(dados))
        .layer(TraceLayer::new_for_http());

    tracing::info!("Fake De Olho na Fila listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
