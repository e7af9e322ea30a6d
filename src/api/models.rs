use serde::{Deserialize, Serialize};

/// Where a lyrics result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LyricsSource {
    Lrclib,
    Genius,
    LyricsOvh,
    Netease,
    Qqmusic,
    Kugou,
    Manual,
    Youtube,
    Upload,
    None,
}

impl LyricsSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lrclib => "lrclib",
            Self::Genius => "genius",
            Self::LyricsOvh => "lyrics_ovh",
            Self::Netease => "netease",
            Self::Qqmusic => "qqmusic",
            Self::Kugou => "kugou",
            Self::Manual => "manual",
            Self::Youtube => "youtube",
            Self::Upload => "upload",
            Self::None => "none",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); anything unrecognized (old or
    /// hand-edited rows) maps to `None`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "lrclib" => Self::Lrclib,
            "genius" => Self::Genius,
            "lyrics_ovh" => Self::LyricsOvh,
            "netease" => Self::Netease,
            "qqmusic" => Self::Qqmusic,
            "kugou" => Self::Kugou,
            "manual" => Self::Manual,
            "youtube" => Self::Youtube,
            "upload" => Self::Upload,
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for LyricsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical output of any provider or of the cache. `text` is always plain,
/// newline-joined, with timing markers already stripped.
#[derive(Debug, Clone)]
pub struct LyricsResult {
    pub artist: String,
    pub track: String,
    pub source: LyricsSource,
    pub text: String,
}

/// One timed lyrics line, in seconds. Intermediate representation; only the
/// upload preview path exposes it on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedCaption {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Deserialize)]
pub struct LyricsQuery {
    pub id: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LyricsResponse {
    pub available: bool,
    pub lyrics: String,
    pub artist: String,
    pub track: String,
    pub source: String,
}

impl LyricsResponse {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            lyrics: String::new(),
            artist: String::new(),
            track: String::new(),
            source: LyricsSource::None.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManualLyricsBody {
    pub video_id: String,
    pub artist: String,
    pub track: String,
    pub lyrics: String,
}

#[derive(Debug, Serialize)]
pub struct SaveLyricsResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadLrcBody {
    pub video_id: String,
    pub lrc_content: String,
}

#[derive(Debug, Serialize)]
pub struct UploadLrcResponse {
    pub available: bool,
    pub source: String,
    pub captions: Vec<TimedCaption>,
    pub count: usize,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct VideoInfoQuery {
    pub url: Option<String>,
}

#[derive(Deserialize)]
pub struct StreamUrlQuery {
    pub id: Option<String>,
}

#[derive(Serialize)]
pub struct StreamUrlResponse {
    pub url: String,
}

#[derive(Deserialize)]
pub struct ProxyStreamQuery {
    pub v: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_names_round_trip() {
        for source in [
            LyricsSource::Lrclib,
            LyricsSource::Genius,
            LyricsSource::LyricsOvh,
            LyricsSource::Netease,
            LyricsSource::Qqmusic,
            LyricsSource::Kugou,
            LyricsSource::Manual,
            LyricsSource::Youtube,
            LyricsSource::Upload,
            LyricsSource::None,
        ] {
            assert_eq!(LyricsSource::from_name(source.as_str()), source);
        }
    }

    #[test]
    fn unknown_source_maps_to_none() {
        assert_eq!(LyricsSource::from_name("lyrics.ovh"), LyricsSource::None);
        assert_eq!(LyricsSource::from_name(""), LyricsSource::None);
    }

    #[test]
    fn source_serializes_as_snake_case() {
        let json = serde_json::to_string(&LyricsSource::LyricsOvh).expect("serialize source");
        assert_eq!(json, "\"lyrics_ovh\"");
        let json = serde_json::to_string(&LyricsSource::None).expect("serialize source");
        assert_eq!(json, "\"none\"");
    }
}
