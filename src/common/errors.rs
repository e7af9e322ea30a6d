use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON error envelope returned by every route on a client or server error.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
    /// HTTP status code.
    pub status: u16,
    /// HTTP status reason phrase (e.g. "Bad Request").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// The request path that caused the error.
    pub path: String,
}

impl ApiError {
    fn new(status: u16, error: &str, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            status,
            error: error.into(),
            message: message.into(),
            path: path.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(400, "Bad Request", message, path)
    }

    pub fn not_found(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(404, "Not Found", message, path)
    }

    pub fn internal(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(500, "Internal Server Error", message, path)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Failures from the lyrics cache / manual override store. Callers degrade:
/// a read failure is a cache miss, a write failure returns the result uncached.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures from the yt-dlp subprocess wrapper.
#[derive(Debug, thiserror::Error)]
pub enum YtDlpError {
    #[error("failed to run yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("yt-dlp failed: {0}")]
    Failed(String),
    #[error("unreadable yt-dlp output: {0}")]
    Parse(#[from] serde_json::Error),
}
