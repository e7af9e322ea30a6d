use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};

use crate::{
    api::models::{
        LyricsQuery, LyricsResponse, LyricsSource, ManualLyricsBody, SaveLyricsResponse,
        UploadLrcBody, UploadLrcResponse,
    },
    common::errors::{ApiError, StoreError},
    lyrics::lrc,
    server::AppState,
};

pub async fn get_lyrics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LyricsQuery>,
) -> Response {
    let video_id = query.id.unwrap_or_default().trim().to_string();
    if video_id.is_empty() {
        return ApiError::bad_request("Missing video ID", "/api/lyrics").into_response();
    }

    let mut title = query.title.unwrap_or_default().trim().to_string();
    let mut artist_hint = String::new();
    let mut track_hint = String::new();

    if title.is_empty() {
        // No title from the caller; ask the extractor (slower).
        match state.youtube.title_and_hints(&video_id).await {
            Ok(hints) => {
                title = hints.title;
                artist_hint = hints.artist;
                track_hint = hints.track;
            }
            Err(err) => {
                tracing::warn!("metadata lookup failed for {}: {}", video_id, err);
                return Json(LyricsResponse::unavailable()).into_response();
            }
        }
    }

    tracing::debug!(
        "GET /api/lyrics: id='{}', title='{}', hints='{}'/'{}'",
        video_id,
        title,
        artist_hint,
        track_hint
    );

    let resolution = state
        .resolver
        .resolve(&video_id, &title, &artist_hint, &track_hint)
        .await;

    let source = if resolution.from_cache {
        format!("{} (cached)", resolution.result.source)
    } else {
        resolution.result.source.to_string()
    };

    Json(LyricsResponse {
        available: !resolution.result.text.is_empty(),
        lyrics: resolution.result.text,
        artist: resolution.result.artist,
        track: resolution.result.track,
        source,
    })
    .into_response()
}

pub async fn save_manual(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ManualLyricsBody>,
) -> Response {
    if body.lyrics.trim().is_empty() {
        return ApiError::bad_request("No lyrics provided", "/api/lyrics/manual").into_response();
    }

    let store = state.store.clone();
    let saved = tokio::task::spawn_blocking(move || {
        store.save_manual(&body.artist, &body.track, &body.lyrics)?;

        let video_id = body.video_id.trim();
        if !video_id.is_empty() {
            let video_title = format!("{} - {}", body.artist, body.track);
            store.save_lyrics(
                video_id,
                &video_title,
                &body.artist,
                &body.track,
                LyricsSource::Manual.as_str(),
                &body.lyrics,
            )?;
        }
        Ok::<_, StoreError>(())
    })
    .await;

    match saved {
        Ok(Ok(())) => Json(SaveLyricsResponse {
            success: true,
            message: "Lyrics saved".to_string(),
        })
        .into_response(),
        Ok(Err(err)) => {
            tracing::error!("failed to save manual lyrics: {}", err);
            ApiError::internal(err.to_string(), "/api/lyrics/manual").into_response()
        }
        Err(err) => {
            tracing::error!("manual save task failed: {}", err);
            ApiError::internal(err.to_string(), "/api/lyrics/manual").into_response()
        }
    }
}

/// Preview-only: parse an uploaded LRC file into timed captions without
/// persisting anything.
pub async fn upload_lrc(Json(body): Json<UploadLrcBody>) -> Response {
    if body.video_id.trim().is_empty() || body.lrc_content.is_empty() {
        return ApiError::bad_request("Missing videoId or lrcContent", "/api/lyrics/upload")
            .into_response();
    }

    let captions = lrc::parse(&body.lrc_content);
    if captions.is_empty() {
        return ApiError::bad_request("Failed to parse LRC content", "/api/lyrics/upload")
            .into_response();
    }

    let count = captions.len();
    Json(UploadLrcResponse {
        available: true,
        source: LyricsSource::Upload.to_string(),
        captions,
        count,
    })
    .into_response()
}
