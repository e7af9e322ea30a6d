use async_trait::async_trait;
use serde::Deserialize;

use super::{LyricsProvider, lrc};
use crate::api::models::{LyricsResult, LyricsSource};
use crate::common::http::HttpClient;

pub struct LrcLibProvider {
    client: reqwest::Client,
}

/// One hit from `GET /api/search`. Everything is optional at the boundary;
/// a hit with neither lyrics field is skipped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    track_name: Option<String>,
    artist_name: Option<String>,
    synced_lyrics: Option<String>,
    plain_lyrics: Option<String>,
}

impl LrcLibProvider {
    pub fn new() -> Self {
        Self {
            client: HttpClient::new().unwrap_or_default(),
        }
    }

    /// Time-coded lyrics win over the plain field; either way the result is
    /// flattened to plain text.
    fn hit_text(hit: &SearchHit) -> Option<String> {
        if let Some(synced) = hit.synced_lyrics.as_deref() {
            let plain = lrc::to_plain_text(synced);
            if !plain.is_empty() {
                return Some(plain);
            }
        }
        hit.plain_lyrics
            .as_deref()
            .map(str::trim)
            .filter(|plain| !plain.is_empty())
            .map(str::to_string)
    }
}

#[async_trait]
impl LyricsProvider for LrcLibProvider {
    fn name(&self) -> &'static str {
        "lrclib"
    }

    async fn fetch(&self, artist: &str, track: &str) -> Option<LyricsResult> {
        if track.is_empty() {
            return None;
        }

        let mut url = format!(
            "https://lrclib.net/api/search?track_name={}",
            urlencoding::encode(track)
        );
        if !artist.is_empty() {
            url.push_str(&format!("&artist_name={}", urlencoding::encode(artist)));
        }

        let resp = self.client.get(url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let hits: Vec<SearchHit> = resp.json().await.ok()?;

        for hit in &hits {
            let Some(text) = Self::hit_text(hit) else {
                continue;
            };
            if text.lines().count() > 3 {
                return Some(LyricsResult {
                    artist: hit.artist_name.clone().unwrap_or_else(|| artist.to_string()),
                    track: hit.track_name.clone().unwrap_or_else(|| track.to_string()),
                    source: LyricsSource::Lrclib,
                    text,
                });
            }
        }
        None
    }
}
