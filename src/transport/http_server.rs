use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{
    server::AppState,
    transport::routes::{lyrics, videos},
};

pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/search", get(videos::search))
        .route("/video_info", get(videos::video_info))
        .route("/stream_url", get(videos::stream_url))
        .route("/lyrics", get(lyrics::get_lyrics))
        .route("/lyrics/manual", post(lyrics::save_manual))
        .route("/lyrics/upload", post(lyrics::upload_lrc));

    Router::new()
        .nest("/api", api_routes)
        .route("/proxy_stream", get(videos::proxy_stream))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
