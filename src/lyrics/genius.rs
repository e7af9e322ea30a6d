use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use super::LyricsProvider;
use crate::api::models::{LyricsResult, LyricsSource};
use crate::common::http::HttpClient;

pub struct GeniusProvider {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct MultiSearch {
    response: Option<SearchResponse>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    sections: Option<Vec<Section>>,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(rename = "type")]
    kind: Option<String>,
    hits: Option<Vec<Hit>>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    result: Option<SongHit>,
}

#[derive(Debug, Deserialize)]
struct SongHit {
    url: Option<String>,
    title: Option<String>,
    primary_artist: Option<PrimaryArtist>,
}

#[derive(Debug, Deserialize)]
struct PrimaryArtist {
    name: Option<String>,
}

impl GeniusProvider {
    pub fn new() -> Self {
        Self {
            client: HttpClient::new().unwrap_or_default(),
        }
    }
}

/// First song-type hit of a multi-search response, if any.
fn first_song_hit(search: MultiSearch) -> Option<SongHit> {
    search
        .response?
        .sections?
        .into_iter()
        .find(|section| section.kind.as_deref() == Some("song"))?
        .hits?
        .into_iter()
        .next()?
        .result
}

/// Best-effort lyrics extraction from a song page. Tries the
/// `Lyrics__Container` div blocks first, then the embedded-JSON lyrics body.
/// Regex-over-HTML is fragile by design; a miss here is a provider miss.
fn extract_lyrics_from_html(html: &str) -> Option<String> {
    let container = Regex::new(r#"(?is)<div[^>]*class="[^"]*Lyrics__Container[^"]*"[^>]*>(.*?)</div>"#).unwrap();

    let blocks: Vec<String> = container
        .captures_iter(html)
        .map(|caps| strip_tags(&caps[1]))
        .filter(|block| !block.is_empty())
        .collect();
    if !blocks.is_empty() {
        return Some(blocks.join("\n\n"));
    }

    let embedded = Regex::new(r#""lyrics":\s*\{"body":\s*\{"html":\s*"([^"]+)""#).unwrap();
    let caps = embedded.captures(html)?;
    let unescaped = Regex::new(r"\\(.)").unwrap().replace_all(&caps[1], "$1");
    let text = strip_tags(&unescaped);
    if text.is_empty() { None } else { Some(text) }
}

/// Break tags become newlines, every other tag is dropped, entities decoded.
fn strip_tags(fragment: &str) -> String {
    let breaks = Regex::new(r"(?i)<br\s*/?>").unwrap();
    let tags = Regex::new(r"<[^>]*>").unwrap();
    let text = breaks.replace_all(fragment, "\n");
    let text = tags.replace_all(&text, "");
    unescape_html(text.trim())
}

fn unescape_html(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
}

#[async_trait]
impl LyricsProvider for GeniusProvider {
    fn name(&self) -> &'static str {
        "genius"
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

        let url = format!(
            "https://genius.com/api/search/multi?q={}",
            urlencoding::encode(&query)
        );
        let resp = self.client.get(url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let search: MultiSearch = resp.json().await.ok()?;
        let song = first_song_hit(search)?;
        let song_url = song.url.as_deref()?;

        let page = self.client.get(song_url).send().await.ok()?;
        let html = page.text().await.ok()?;
        let text = extract_lyrics_from_html(&html)?;

        Some(LyricsResult {
            artist: song
                .primary_artist
                .and_then(|primary| primary.name)
                .unwrap_or_else(|| artist.to_string()),
            track: song.title.unwrap_or_else(|| track.to_string()),
            source: LyricsSource::Genius,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_joins_container_blocks() {
        let html = r#"
            <div class="Lyrics__Container-sc-1ynbvzw-1">First line<br>Second line</div>
            <p>noise</p>
            <div class="Lyrics__Container-sc-1ynbvzw-1"><i>Third</i> line<br/>Fourth line</div>
        "#;
        let text = extract_lyrics_from_html(html).expect("lyrics");
        assert_eq!(text, "First line\nSecond line\n\nThird line\nFourth line");
    }

    #[test]
    fn falls_back_to_embedded_json_body() {
        let html = r#"var data = {"lyrics": {"body": {"html": "Hello<br>darkness & friend"}}};"#;
        let text = extract_lyrics_from_html(html).expect("lyrics");
        assert!(text.starts_with("Hello\ndarkness"));
    }

    #[test]
    fn no_markup_means_miss() {
        assert_eq!(extract_lyrics_from_html("<html><body>nothing</body></html>"), None);
    }

    #[test]
    fn entities_are_unescaped() {
        assert_eq!(
            strip_tags("Tom &amp; Jerry&nbsp;&#39;24"),
            "Tom & Jerry '24"
        );
    }

    #[test]
    fn picks_first_song_section_hit() {
        let search: MultiSearch = serde_json::from_str(
            r#"{
                "response": {
                    "sections": [
                        {"type": "artist", "hits": [{"result": {"title": "wrong"}}]},
                        {"type": "song", "hits": [
                            {"result": {"url": "https://genius.com/x", "title": "Hello",
                                        "primary_artist": {"name": "Adele"}}},
                            {"result": {"title": "second"}}
                        ]}
                    ]
                }
            }"#,
        )
        .expect("parse search");
        let song = first_song_hit(search).expect("song hit");
        assert_eq!(song.title.as_deref(), Some("Hello"));
        assert_eq!(song.url.as_deref(), Some("https://genius.com/x"));
    }
}
