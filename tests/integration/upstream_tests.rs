//! De Olho na Fila client tests against a local upstream

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use chrono::{DateTime, Utc};
use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::Value;

use onde2adose_server::{
    api,
    config::{AppConfig, UpstreamConfig},
    services::{DeOlhoNaFilaClient, FetchContext, ReqwestTransport, Services},
    AppState, FetchError, TransportError,
};

use crate::common::{spawn, FIXTURE};

const PATH: &str = "/processadores/dados.php";

/// Start an upstream answering every POST with `status` and `body`
async fn spawn_upstream(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route(PATH, post(move || async move { (status, body) }));
    format!("{}{}", spawn(app).await, PATH)
}

fn upstream_config(url: &str, timeout_secs: u64) -> UpstreamConfig {
    UpstreamConfig {
        url: url.to_string(),
        timeout_secs,
        ..Default::default()
    }
}

fn client_for(url: &str) -> DeOlhoNaFilaClient {
    let transport = ReqwestTransport::new(&upstream_config(url, 3)).expect("Failed to build client");
    DeOlhoNaFilaClient::with_url(Arc::new(transport), url)
}

#[tokio::test]
async fn test_fetch_decodes_upstream_dump() {
    let url = spawn_upstream(StatusCode::OK, FIXTURE).await;

    let units = client_for(&url)
        .fetch(&FetchContext::background())
        .await
        .expect("Fetch failed");

    assert_eq!(units.len(), 4);
    assert_eq!(units[0].name, "GRCS ESCOLA DE SAMBA VAI-VAI");
    assert_eq!(units[0].id(), 1571);
    assert_eq!(units[1].id(), 23);
    assert!(units[1].has_coronavac());
    assert!(units[2].has_pfizer());
    assert_eq!(units[3].line_index(), 0);
    assert!(!units[3].has_astrazeneca());
    assert_eq!(
        units[2].last_updated_at(),
        "2021-08-11T13:45:27.002Z".parse::<DateTime<Utc>>().unwrap()
    );
}

#[tokio::test]
async fn test_fetch_rejects_server_error() {
    let url = spawn_upstream(StatusCode::INTERNAL_SERVER_ERROR, "[]").await;

    let err = client_for(&url)
        .fetch(&FetchContext::background())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::UpstreamStatus(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn test_fetch_does_not_follow_redirects() {
    let app = Router::new().route(
        PATH,
        post(|| async { (StatusCode::FOUND, [(LOCATION, "/elsewhere")]).into_response() }),
    );
    let url = format!("{}{}", spawn(app).await, PATH);

    let err = client_for(&url)
        .fetch(&FetchContext::background())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::UpstreamStatus(s) if s == StatusCode::FOUND));
}

#[tokio::test]
async fn test_fetch_rejects_object_payload() {
    let url = spawn_upstream(StatusCode::OK, "{}").await;

    let err = client_for(&url)
        .fetch(&FetchContext::background())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_fetch_accepts_empty_array() {
    let url = spawn_upstream(StatusCode::OK, "[]").await;

    let units = client_for(&url)
        .fetch(&FetchContext::background())
        .await
        .expect("Fetch failed");

    assert!(units.is_empty());
}

#[tokio::test]
async fn test_fetch_reports_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}{}", listener.local_addr().unwrap(), PATH);
    drop(listener);

    let err = client_for(&url)
        .fetch(&FetchContext::background())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport(TransportError::Request(_))));
}

async fn slow_upstream() -> String {
    let app = Router::new().route(
        PATH,
        post(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "[]"
        }),
    );
    format!("{}{}", spawn(app).await, PATH)
}

#[tokio::test]
async fn test_client_timeout_surfaces_as_transport_timeout() {
    let url = slow_upstream().await;
    let transport = ReqwestTransport::new(&upstream_config(&url, 1)).unwrap();
    let client = DeOlhoNaFilaClient::with_url(Arc::new(transport), url);

    let err = client.fetch(&FetchContext::background()).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(TransportError::Timeout)));
}

#[tokio::test]
async fn test_cancel_aborts_slow_upstream() {
    let url = slow_upstream().await;
    let client = client_for(&url);
    let (ctx, handle) = FetchContext::with_cancel();

    let fetch = tokio::spawn(async move { client.fetch(&ctx).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.cancel();

    let result = tokio::time::timeout(Duration::from_secs(2), fetch)
        .await
        .expect("Fetch kept running after cancel")
        .unwrap();

    assert!(matches!(result, Err(FetchError::Transport(TransportError::Cancelled))));
}

#[tokio::test]
async fn test_concurrent_fetches_do_not_interfere() {
    let one = spawn_upstream(StatusCode::OK, r#"[{"id_tb_unidades":"1"}]"#).await;
    let two = spawn_upstream(StatusCode::OK, r#"[{"id_tb_unidades":"2"},{"id_tb_unidades":"22"}]"#).await;
    let broken = spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, "").await;

    let (a, b, c) = tokio::join!(
        async { client_for(&one).fetch(&FetchContext::background()).await },
        async { client_for(&two).fetch(&FetchContext::background()).await },
        async { client_for(&broken).fetch(&FetchContext::background()).await },
    );

    let a: Vec<i64> = a.unwrap().iter().map(|u| u.id()).collect();
    let b: Vec<i64> = b.unwrap().iter().map(|u| u.id()).collect();
    assert_eq!(a, vec![1]);
    assert_eq!(b, vec![2, 22]);
    assert!(matches!(c, Err(FetchError::UpstreamStatus(_))));
}

#[tokio::test]
async fn test_relay_end_to_end() {
    let upstream = spawn_upstream(StatusCode::OK, FIXTURE).await;
    let config = AppConfig {
        upstream: upstream_config(&upstream, 3),
        ..Default::default()
    };
    let services = Services::new(&config.upstream).expect("Failed to build services");
    let relay = spawn(api::create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    }))
    .await;

    let response = Client::new()
        .post(format!("{}/data.raw", relay))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("dados=dados")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let relayed: Value = response.json().await.unwrap();
    let original: Value = serde_json::from_str(FIXTURE).unwrap();
    assert_eq!(relayed, original);
}
