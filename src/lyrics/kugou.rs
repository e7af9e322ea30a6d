use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::Value;

use super::{LyricsProvider, lrc};
use crate::api::models::{LyricsResult, LyricsSource};
use crate::common::http::HttpClient;

const SEARCH_URL: &str = "https://mobilecdn.kugou.com/api/v3/search/song";
const KRC_SEARCH_URL: &str = "https://krcs.kugou.com/search";
const DOWNLOAD_URL: &str = "https://lyrics.kugou.com/download";

pub struct KugouProvider {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    info: Option<Vec<KugouSong>>,
}

#[derive(Debug, Deserialize)]
struct KugouSong {
    hash: Option<String>,
    songname: Option<String>,
    singername: Option<String>,
    duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct KrcSearchBody {
    candidates: Option<Vec<KrcCandidate>>,
}

/// Candidate `id` is numeric in some responses and a string in others.
#[derive(Debug, Deserialize)]
struct KrcCandidate {
    id: Option<Value>,
    accesskey: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadBody {
    content: Option<String>,
}

fn candidate_id(candidate: &KrcCandidate) -> Option<String> {
    match candidate.id.as_ref()? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl KugouProvider {
    pub fn new() -> Self {
        Self {
            client: HttpClient::new().unwrap_or_default(),
        }
    }

    async fn search_songs(&self, query: &str) -> Option<Vec<KugouSong>> {
        let resp = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("format", "json"),
                ("keyword", query),
                ("page", "1"),
                ("pagesize", "10"),
                ("showtype", "1"),
            ])
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body: SearchBody = resp.json().await.ok()?;
        body.data?.info
    }

    /// Lyrics need a two-step fetch: the krc search exchanges song hash +
    /// duration for a candidate id/accesskey pair, which unlocks the actual
    /// download. The payload comes back base64-encoded.
    async fn download_lyric(&self, song: &KugouSong) -> Option<String> {
        let hash = song.hash.as_deref()?;
        let keyword = song.songname.as_deref().unwrap_or_default();
        let duration_ms = song.duration.unwrap_or(0).saturating_mul(1000);

        let resp = self
            .client
            .get(KRC_SEARCH_URL)
            .query(&[
                ("ver", "1"),
                ("man", "yes"),
                ("client", "mobi"),
                ("keyword", keyword),
                ("duration", &duration_ms.to_string()),
                ("hash", hash),
            ])
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body: KrcSearchBody = resp.json().await.ok()?;
        let candidate = body.candidates?.into_iter().next()?;
        let id = candidate_id(&candidate)?;
        let accesskey = candidate.accesskey.as_deref()?;

        let resp = self
            .client
            .get(DOWNLOAD_URL)
            .query(&[
                ("ver", "1"),
                ("client", "pc"),
                ("id", id.as_str()),
                ("accesskey", accesskey),
                ("fmt", "lrc"),
                ("charset", "utf8"),
            ])
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body: DownloadBody = resp.json().await.ok()?;
        let content = body.content?;

        let bytes = BASE64.decode(content.trim()).ok()?;
        String::from_utf8(bytes).ok()
    }
}

#[async_trait]
impl LyricsProvider for KugouProvider {
    fn name(&self) -> &'static str {
        "kugou"
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

        for song in songs.iter().take(5) {
            let Some(raw_lrc) = self.download_lyric(song).await else {
                continue;
            };

            let captions = lrc::parse(&raw_lrc);
            if captions.len() <= 3 {
                continue;
            }

            return Some(LyricsResult {
                artist: song
                    .singername
                    .clone()
                    .unwrap_or_else(|| artist.to_string()),
                track: song
                    .songname
                    .clone()
                    .unwrap_or_else(|| track.to_string()),
                source: LyricsSource::Kugou,
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
    fn candidate_id_accepts_number_and_string() {
        let numeric: KrcCandidate =
            serde_json::from_str(r#"{"id": 12345, "accesskey": "AB"}"#).expect("parse");
        assert_eq!(candidate_id(&numeric).as_deref(), Some("12345"));

        let string: KrcCandidate =
            serde_json::from_str(r#"{"id": "67890", "accesskey": "AB"}"#).expect("parse");
        assert_eq!(candidate_id(&string).as_deref(), Some("67890"));

        let missing: KrcCandidate = serde_json::from_str(r#"{"accesskey": "AB"}"#).expect("parse");
        assert_eq!(candidate_id(&missing), None);
    }

    #[test]
    fn search_schema_reads_info_list() {
        let body: SearchBody = serde_json::from_str(
            r#"{"data": {"info": [
                {"hash": "F83AF05B", "songname": "晴天", "singername": "周杰倫", "duration": 269}
            ]}}"#,
        )
        .expect("parse search body");
        let songs = body.data.unwrap().info.unwrap();
        assert_eq!(songs[0].hash.as_deref(), Some("F83AF05B"));
        assert_eq!(songs[0].duration, Some(269));
    }
}
