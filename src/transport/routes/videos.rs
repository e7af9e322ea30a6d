use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    api::models::{ProxyStreamQuery, SearchQuery, StreamUrlQuery, StreamUrlResponse, VideoInfoQuery},
    common::errors::ApiError,
    common::http::HttpClient,
    server::AppState,
};

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let q = query.q.unwrap_or_default().trim().to_string();
    if q.is_empty() {
        return ApiError::bad_request("Missing search query", "/api/search").into_response();
    }

    tracing::info!("searching for: {}", q);
    match state.youtube.search(&q).await {
        Ok(hits) => Json(hits).into_response(),
        Err(err) => {
            tracing::error!("search failed: {}", err);
            ApiError::internal(err.to_string(), "/api/search").into_response()
        }
    }
}

pub async fn video_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VideoInfoQuery>,
) -> Response {
    let url = query.url.unwrap_or_default().trim().to_string();
    if url.is_empty() {
        return ApiError::bad_request("Missing URL parameter", "/api/video_info").into_response();
    }

    match state.youtube.video_info(&url).await {
        Ok(hit) => Json(hit).into_response(),
        Err(err) => {
            tracing::warn!("video info failed for {}: {}", url, err);
            ApiError::not_found(err.to_string(), "/api/video_info").into_response()
        }
    }
}

/// The player never gets an upstream URL directly; it points at our proxy.
pub async fn stream_url(Query(query): Query<StreamUrlQuery>) -> Response {
    let video_id = query.id.unwrap_or_default().trim().to_string();
    if video_id.is_empty() {
        return ApiError::bad_request("Missing video ID", "/api/stream_url").into_response();
    }

    Json(StreamUrlResponse {
        url: format!("/proxy_stream?v={}", video_id),
    })
    .into_response()
}

/// Resolve a progressive format and pipe it through, forwarding the Range
/// header both ways so the player can seek.
pub async fn proxy_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProxyStreamQuery>,
    headers: HeaderMap,
) -> Response {
    let video_id = query.v.unwrap_or_default().trim().to_string();
    if video_id.is_empty() {
        return ApiError::bad_request("Missing video id", "/proxy_stream").into_response();
    }

    tracing::info!("proxying stream for {}", video_id);
    let format = match state.youtube.stream_format(&video_id).await {
        Ok(format) => format,
        Err(err) => {
            tracing::error!("no stream for {}: {}", video_id, err);
            return ApiError::not_found(err.to_string(), "/proxy_stream").into_response();
        }
    };
    tracing::debug!("selected format {} for {}", format.format_id, video_id);

    let mut request = state
        .http
        .get(&format.url)
        .header(header::USER_AGENT, HttpClient::default_user_agent())
        .header(header::ACCEPT, "*/*")
        .header(header::ORIGIN, "https://www.youtube.com")
        .header(header::REFERER, "https://www.youtube.com/");
    if let Some(range) = headers.get(header::RANGE).and_then(|value| value.to_str().ok()) {
        request = request.header(header::RANGE, range);
    }

    let upstream = match request.send().await {
        Ok(resp) => resp,
        Err(err) => {
            tracing::error!("upstream request failed: {}", err);
            return ApiError::internal(err.to_string(), "/proxy_stream").into_response();
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CACHE_CONTROL, "no-cache");
    for name in [header::CONTENT_RANGE, header::CONTENT_LENGTH] {
        if let Some(value) = upstream.headers().get(name.as_str()) {
            if let Ok(value) = value.to_str() {
                builder = builder.header(name, value);
            }
        }
    }

    match builder.body(Body::from_stream(upstream.bytes_stream())) {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("failed to build proxy response: {}", err);
            ApiError::internal(err.to_string(), "/proxy_stream").into_response()
        }
    }
}
