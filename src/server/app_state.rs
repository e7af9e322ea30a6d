use std::sync::Arc;

use crate::configs::Config;
use crate::lyrics::LyricsResolver;
use crate::store::Store;
use crate::youtube::YtDlp;

/// Top-level application state, built once in `main`.
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub resolver: Arc<LyricsResolver>,
    pub youtube: Arc<YtDlp>,
    /// Shared client for the stream proxy (no total-request timeout).
    pub http: reqwest::Client,
}
