use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;

use super::{LyricsProvider, lrc};
use crate::api::models::{LyricsResult, LyricsSource};
use crate::common::http::HttpClient;

const SEARCH_URL: &str = "https://u.y.qq.com/cgi-bin/musicu.fcg";
const LYRIC_URL: &str = "https://c.y.qq.com/lyric/fcgi-bin/fcg_query_lyric_new.fcg";
const REFERER: &str = "https://y.qq.com/";

pub struct QqMusicProvider {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "music.search.SearchCgiService")]
    service: Option<SearchService>,
}

#[derive(Debug, Deserialize)]
struct SearchService {
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    body: Option<SearchDataBody>,
}

#[derive(Debug, Deserialize)]
struct SearchDataBody {
    song: Option<SongList>,
}

#[derive(Debug, Deserialize)]
struct SongList {
    list: Option<Vec<QqSong>>,
}

#[derive(Debug, Deserialize)]
struct QqSong {
    mid: Option<String>,
    name: Option<String>,
    singer: Option<Vec<Singer>>,
}

#[derive(Debug, Deserialize)]
struct Singer {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LyricBody {
    lyric: Option<String>,
}

impl QqMusicProvider {
    pub fn new() -> Self {
        Self {
            client: HttpClient::new().unwrap_or_default(),
        }
    }

    async fn search_songs(&self, query: &str) -> Option<Vec<QqSong>> {
        let payload = json!({
            "music.search.SearchCgiService": {
                "method": "DoSearchForQQMusicDesktop",
                "module": "music.search.SearchCgiService",
                "param": {
                    "query": query,
                    "num_per_page": 10,
                    "page_num": 1,
                    "search_type": 0
                }
            }
        });

        let resp = self
            .client
            .post(SEARCH_URL)
            .header("Referer", REFERER)
            .header("Origin", "https://y.qq.com")
            .json(&payload)
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }

        let envelope: SearchEnvelope = resp.json().await.ok()?;
        envelope.service?.data?.body?.song?.list
    }

    async fn song_lyric(&self, song_mid: &str) -> Option<String> {
        let resp = self
            .client
            .get(LYRIC_URL)
            .query(&[
                ("songmid", song_mid),
                ("g_tk", "5381"),
                ("format", "json"),
                ("nobase64", "1"),
            ])
            .header("Referer", REFERER)
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }

        let raw = resp.text().await.ok()?;
        let body: LyricBody = serde_json::from_str(jsonp_payload(&raw)?).ok()?;
        body.lyric.map(decode_lyric)
    }
}

/// The endpoint sometimes wraps the JSON in a JSONP callback; take the outer
/// brace span either way.
fn jsonp_payload(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return Some(trimmed);
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

/// Despite `nobase64`, the lyric field may still arrive base64-encoded.
fn decode_lyric(lyric: String) -> String {
    BASE64
        .decode(lyric.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or(lyric)
}

#[async_trait]
impl LyricsProvider for QqMusicProvider {
    fn name(&self) -> &'static str {
        "qqmusic"
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
            let Some(mid) = song.mid.as_deref() else {
                continue;
            };
            let Some(raw_lrc) = self.song_lyric(mid).await else {
                continue;
            };

            let captions = lrc::parse(&raw_lrc);
            if captions.len() <= 3 {
                continue;
            }

            let artist_name = song
                .singer
                .and_then(|singers| singers.into_iter().next())
                .and_then(|first| first.name)
                .unwrap_or_else(|| artist.to_string());

            return Some(LyricsResult {
                artist: artist_name,
                track: song.name.unwrap_or_else(|| track.to_string()),
                source: LyricsSource::Qqmusic,
                text: lrc::to_plain_text(&raw_lrc),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsonp_wrapper_is_unwrapped() {
        assert_eq!(
            jsonp_payload(r#"MusicJsonCallback({"lyric":"x"})"#),
            Some(r#"{"lyric":"x"}"#)
        );
        assert_eq!(jsonp_payload(r#"{"lyric":"x"}"#), Some(r#"{"lyric":"x"}"#));
        assert_eq!(jsonp_payload("no json here"), None);
    }

    #[test]
    fn base64_lyric_is_decoded_plain_passes_through() {
        let encoded = BASE64.encode("[00:01.00]第一行");
        assert_eq!(decode_lyric(encoded), "[00:01.00]第一行");
        // Not base64: returned untouched.
        assert_eq!(decode_lyric("[00:01.00]plain".to_string()), "[00:01.00]plain");
    }

    #[test]
    fn search_schema_reaches_song_list() {
        let envelope: SearchEnvelope = serde_json::from_str(
            r#"{"music.search.SearchCgiService": {"data": {"body": {"song": {"list": [
                {"mid": "003aAYrm3GE0Ac", "name": "晴天", "singer": [{"name": "周杰倫"}]}
            ]}}}}}"#,
        )
        .expect("parse envelope");
        let list = envelope
            .service
            .and_then(|s| s.data)
            .and_then(|d| d.body)
            .and_then(|b| b.song)
            .and_then(|s| s.list)
            .expect("song list");
        assert_eq!(list[0].mid.as_deref(), Some("003aAYrm3GE0Ac"));
    }
}
