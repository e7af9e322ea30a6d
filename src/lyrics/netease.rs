use async_trait::async_trait;
use serde::Deserialize;

use super::{LyricsProvider, lrc};
use crate::api::models::{LyricsResult, LyricsSource};
use crate::common::http::HttpClient;

const SEARCH_URL: &str = "https://music.163.com/api/search/get/web";
const REFERER: &str = "https://music.163.com/";

pub struct NeteaseProvider {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    songs: Option<Vec<Song>>,
}

#[derive(Debug, Deserialize)]
struct Song {
    id: Option<i64>,
    name: Option<String>,
    artists: Option<Vec<ArtistRef>>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LyricBody {
    lrc: Option<LrcField>,
}

#[derive(Debug, Deserialize)]
struct LrcField {
    lyric: Option<String>,
}

impl NeteaseProvider {
    pub fn new() -> Self {
        Self {
            client: HttpClient::new().unwrap_or_default(),
        }
    }

    async fn search_songs(&self, query: &str) -> Option<Vec<Song>> {
        let resp = self
            .client
            .post(SEARCH_URL)
            .header("Referer", REFERER)
            .form(&[("s", query), ("type", "1"), ("limit", "15"), ("offset", "0")])
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body: SearchBody = resp.json().await.ok()?;
        body.result?.songs
    }

    async fn song_lyric(&self, song_id: i64) -> Option<String> {
        let url = format!(
            "https://music.163.com/api/song/lyric?id={}&lv=1&kv=1&tv=-1",
            song_id
        );
        let resp = self
            .client
            .get(url)
            .header("Referer", REFERER)
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body: LyricBody = resp.json().await.ok()?;
        body.lrc?.lyric
    }
}

#[async_trait]
impl LyricsProvider for NeteaseProvider {
    fn name(&self) -> &'static str {
        "netease"
    }

    async fn fetch(&self, artist: &str, track: &str) -> Option<LyricsResult> {
        if track.is_empty() {
            return None;
        }
        let query = if artist.is_empty() {
            track.to_string()
        } else {
            format!("{} {}", artist, track)
        };

        let songs = self.search_songs(&query).await?;

        for song in songs.into_iter().take(5) {
            let Some(song_id) = song.id else { continue };
            let Some(raw_lrc) = self.song_lyric(song_id).await else {
                continue;
            };

            let plain = lrc::to_plain_text(&raw_lrc);
            if plain.lines().count() <= 3 {
                continue;
            }

            let artist_name = song
                .artists
                .and_then(|artists| artists.into_iter().next())
                .and_then(|first| first.name)
                .unwrap_or_else(|| artist.to_string());

            return Some(LyricsResult {
                artist: artist_name,
                track: song.name.unwrap_or_else(|| track.to_string()),
                source: LyricsSource::Netease,
                text: plain,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_schema_tolerates_missing_fields() {
        let body: SearchBody = serde_json::from_str(
            r#"{"result": {"songs": [
                {"id": 42, "name": "晴天", "artists": [{"name": "周杰倫"}]},
                {"name": "no id"}
            ]}}"#,
        )
        .expect("parse search body");
        let songs = body.result.unwrap().songs.unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].id, Some(42));
        assert_eq!(songs[1].id, None);
    }

    #[test]
    fn lyric_schema_reaches_nested_field() {
        let body: LyricBody =
            serde_json::from_str(r#"{"lrc": {"lyric": "[00:01.00]line"}}"#).expect("parse lyric");
        assert_eq!(body.lrc.unwrap().lyric.as_deref(), Some("[00:01.00]line"));
    }
}
