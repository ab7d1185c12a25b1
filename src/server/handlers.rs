//! Request handlers.
//!
//! `GET /image/:image_key[?resize=WxH]`
//!
//! | Condition | Response |
//! |---|---|
//! | no `resize` (or empty) | `307` to the store's public URL, or the original bytes |
//! | malformed `resize` | `400` |
//! | `If-None-Match` matches | `304` |
//! | object missing | `404` |
//! | image cannot be decoded, or `0x0` | `400` |
//! | store or encode failure | `500` |
//! | otherwise | `200` PNG with `Cache-Control` and the original's `ETag` |

use super::AppState;
use super::error::{ServerError, ServerResult};
use crate::imaging::{Dimensions, parse_dimensions, transform_with};
use crate::store::StoredObject;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct ResizeQuery {
    pub resize: Option<String>,
}

fn if_none_match(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

fn set_etag(response: &mut Response, etag: Option<&str>) {
    if let Some(value) = etag.and_then(|e| HeaderValue::from_str(e).ok()) {
        response.headers_mut().insert(header::ETAG, value);
    }
}

pub async fn resize_handler(
    State(state): State<Arc<AppState>>,
    Path(image_key): Path<String>,
    Query(query): Query<ResizeQuery>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    let Some(resize) = query.resize.filter(|r| !r.is_empty()) else {
        return original(&state, &image_key, &headers).await;
    };

    let size = parse_dimensions(&resize).map_err(|e| {
        warn!("Rejecting resize={:?} for {}: {}", resize, image_key, e);
        ServerError::from(e)
    })?;

    let object = state
        .store
        .fetch(&image_key, if_none_match(&headers))
        .await?;

    let png = resize_object(&state, object.body, size).await?;

    let mut response = (StatusCode::OK, png).into_response();
    let cache_control = HeaderValue::from_str(&format!("public, max-age={}", state.cache_max_age))
        .map_err(|e| ServerError::Internal(format!("Invalid Cache-Control value: {e}")))?;
    let response_headers = response.headers_mut();
    response_headers.insert(header::CACHE_CONTROL, cache_control);
    response_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    set_etag(&mut response, object.etag.as_deref());
    Ok(response)
}

/// Run the synchronous pipeline on the blocking pool.
async fn resize_object(state: &AppState, body: Vec<u8>, size: Dimensions) -> ServerResult<Vec<u8>> {
    let backend = Arc::clone(&state.backend);
    let result = tokio::task::spawn_blocking(move || {
        let mut out = Vec::new();
        transform_with(backend.as_ref(), body.as_slice(), &mut out, None, size).map(|()| out)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Transform task failed: {e}")))?;

    let png = result?;
    debug!("Resized to {}: {} bytes", size, png.len());
    Ok(png)
}

/// Requests without `resize`: redirect to the original, or pass it through.
async fn original(state: &AppState, image_key: &str, headers: &HeaderMap) -> ServerResult<Response> {
    if let Some(url) = state.store.public_url(image_key) {
        debug!("Redirecting {} to {}", image_key, url);
        return Ok(Redirect::temporary(&url).into_response());
    }

    let StoredObject {
        body,
        content_type,
        etag,
    } = state.store.fetch(image_key, if_none_match(headers)).await?;

    let mut response = (StatusCode::OK, body).into_response();
    if let Some(value) = content_type.and_then(|ct| HeaderValue::from_str(&ct).ok()) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    set_etag(&mut response, etag.as_deref());
    Ok(response)
}

pub async fn robots_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain")],
        "User-Agent: *\nDisallow: /",
    )
}
