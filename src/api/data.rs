//! Queue data endpoints

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::{NormalizedUnit, QueueUnit},
    services::{deolhonafila::FORM_CONTENT_TYPE, FetchContext},
    AppState,
};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

const MANDATORY_BODY_FIELD: &str = "dados";

/// Republish the upstream feed verbatim
#[utoipa::path(
    post,
    path = "/data.raw",
    tag = "data",
    request_body(
        content = String,
        content_type = "application/x-www-form-urlencoded",
        description = "Form with a non-empty `dados` field"
    ),
    responses(
        (status = 200, description = "Units as published upstream", body = Vec<QueueUnit>),
        (status = 400, description = "Missing or invalid form", body = ErrorResponse),
        (status = 500, description = "Upstream fetch failed", body = ErrorResponse)
    )
)]
pub async fn raw_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let form = read_form(&headers, &body);
    if form.is_empty() {
        return Err(AppError::BadRequest("missing body".to_string()));
    }

    let has_value = form
        .iter()
        .find(|(key, _)| key == MANDATORY_BODY_FIELD)
        .is_some_and(|(_, value)| !value.is_empty());
    if !has_value {
        return Err(AppError::BadRequest("invalid body".to_string()));
    }

    let units = state.services.units.fetch(&fetch_context(&state)).await?;
    json_response(&units)
}

/// Republish the upstream feed with typed values
#[utoipa::path(
    get,
    path = "/data",
    tag = "data",
    responses(
        (status = 200, description = "Units with derived values", body = Vec<NormalizedUnit>),
        (status = 500, description = "Upstream fetch failed", body = ErrorResponse)
    )
)]
pub async fn normalized_data(State(state): State<AppState>) -> AppResult<Response> {
    let units = state.services.units.fetch(&fetch_context(&state)).await?;
    let normalized: Vec<NormalizedUnit> = units.iter().map(NormalizedUnit::from).collect();
    json_response(&normalized)
}

fn fetch_context(state: &AppState) -> FetchContext {
    FetchContext::background().with_timeout(Duration::from_secs(state.config.upstream.timeout_secs))
}

/// Decode a form-encoded body. Anything that is not form-encoded reads as an
/// empty form, and pairs carrying a malformed percent escape are dropped.
fn read_form(headers: &HeaderMap, body: &[u8]) -> Vec<(String, String)> {
    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE));

    if !is_form {
        return Vec::new();
    }

    body.split(|b| *b == b'&')
        .filter(|pair| has_valid_escapes(pair))
        .flat_map(|pair| url::form_urlencoded::parse(pair).into_owned())
        .collect()
}

/// Every `%` must be followed by two hex digits
fn has_valid_escapes(pair: &[u8]) -> bool {
    pair.iter()
        .enumerate()
        .filter(|(_, b)| **b == b'%')
        .all(|(i, _)| {
            pair.get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        })
}

fn json_response<T: Serialize>(data: &T) -> AppResult<Response> {
    let body = serde_json::to_vec(data)
        .map_err(|e| AppError::Internal(format!("error encoding data: {}", e)))?;

    Ok(([(CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response())
}
