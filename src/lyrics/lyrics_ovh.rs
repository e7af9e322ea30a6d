use async_trait::async_trait;
use serde::Deserialize;

use super::LyricsProvider;
use crate::api::models::{LyricsResult, LyricsSource};
use crate::common::http::HttpClient;

pub struct LyricsOvhProvider {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct OvhResponse {
    lyrics: Option<String>,
}

impl LyricsOvhProvider {
    pub fn new() -> Self {
        Self {
            client: HttpClient::new().unwrap_or_default(),
        }
    }
}

#[async_trait]
impl LyricsProvider for LyricsOvhProvider {
    fn name(&self) -> &'static str {
        "lyrics.ovh"
    }

    async fn fetch(&self, artist: &str, track: &str) -> Option<LyricsResult> {
        // The endpoint is /v1/{artist}/{track}; there is no track-only search.
        if artist.is_empty() || track.is_empty() {
            return None;
        }

        let url = format!(
            "https://api.lyrics.ovh/v1/{}/{}",
            urlencoding::encode(artist),
            urlencoding::encode(track)
        );
        let resp = self.client.get(url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }

        let body: OvhResponse = resp.json().await.ok()?;
        let lyrics = body.lyrics?.trim().to_string();
        if lyrics.is_empty() || lyrics.lines().count() <= 3 {
            return None;
        }

        Some(LyricsResult {
            artist: artist.to_string(),
            track: track.to_string(),
            source: LyricsSource::LyricsOvh,
            text: lyrics,
        })
    }
}
