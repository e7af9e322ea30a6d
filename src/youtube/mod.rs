//! Thin wrapper around the `yt-dlp` executable: keyword search, video
//! metadata (including artist/track hints for the lyrics pipeline) and
//! progressive-stream format selection for the proxy route.

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::common::errors::YtDlpError;

pub struct YtDlp {
    executable: String,
    search_limit: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoHit {
    pub id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub url: String,
}

/// Title plus whatever artist/track metadata the extractor exposes; the
/// hints are frequently empty.
#[derive(Debug, Clone, Default)]
pub struct SongHints {
    pub title: String,
    pub artist: String,
    pub track: String,
}

#[derive(Debug, Clone)]
pub struct StreamFormat {
    pub url: String,
    pub format_id: String,
}

#[derive(Debug, Deserialize)]
struct DumpedInfo {
    id: Option<String>,
    title: Option<String>,
    thumbnail: Option<String>,
    thumbnails: Option<Vec<Thumbnail>>,
    artist: Option<String>,
    creator: Option<String>,
    track: Option<String>,
    webpage_url: Option<String>,
    formats: Option<Vec<DumpedFormat>>,
    entries: Option<Vec<DumpedInfo>>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DumpedFormat {
    format_id: Option<String>,
    url: Option<String>,
    ext: Option<String>,
    vcodec: Option<String>,
    acodec: Option<String>,
}

impl YtDlp {
    pub fn new(executable: &str, search_limit: u32) -> Self {
        Self {
            executable: executable.to_string(),
            search_limit,
        }
    }

    async fn dump(&self, target: &str, flat: bool) -> Result<DumpedInfo, YtDlpError> {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(target)
            .arg("--dump-single-json")
            .arg("--no-warnings")
            .arg("--quiet");
        if flat {
            cmd.arg("--flat-playlist");
        } else {
            cmd.arg("--no-playlist");
        }

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(YtDlpError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<VideoHit>, YtDlpError> {
        let target = format!("ytsearch{}:{}", self.search_limit, query);
        let info = self.dump(&target, true).await?;
        Ok(info
            .entries
            .unwrap_or_default()
            .into_iter()
            .filter_map(hit_from)
            .collect())
    }

    pub async fn video_info(&self, url: &str) -> Result<VideoHit, YtDlpError> {
        let info = self.dump(url, true).await?;
        hit_from(info).ok_or_else(|| YtDlpError::Failed("no video info in output".to_string()))
    }

    /// The lyrics pipeline's fallback when the caller did not pass a title.
    pub async fn title_and_hints(&self, video_id: &str) -> Result<SongHints, YtDlpError> {
        let info = self.dump(&watch_url(video_id), false).await?;
        Ok(SongHints {
            title: info.title.unwrap_or_default(),
            artist: info.artist.or(info.creator).unwrap_or_default(),
            track: info.track.unwrap_or_default(),
        })
    }

    pub async fn stream_format(&self, video_id: &str) -> Result<StreamFormat, YtDlpError> {
        let info = self.dump(&watch_url(video_id), false).await?;
        let formats = info.formats.unwrap_or_default();
        select_format(&formats)
            .ok_or_else(|| YtDlpError::Failed("no compatible format found".to_string()))
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

fn hit_from(info: DumpedInfo) -> Option<VideoHit> {
    let id = info.id?;
    let thumbnail = info.thumbnail.or_else(|| {
        info.thumbnails
            .and_then(|list| list.into_iter().rev().find_map(|thumb| thumb.url))
    });
    let url = info.webpage_url.unwrap_or_else(|| watch_url(&id));
    Some(VideoHit {
        title: info.title.unwrap_or_default(),
        thumbnail,
        url,
        id,
    })
}

/// Progressive (audio+video in one) formats only: the legacy itags first,
/// then any merged mp4, then anything with a video stream.
fn select_format(formats: &[DumpedFormat]) -> Option<StreamFormat> {
    for wanted in ["18", "22"] {
        if let Some(format) = formats
            .iter()
            .find(|f| f.format_id.as_deref() == Some(wanted))
        {
            return as_stream(format);
        }
    }

    if let Some(format) = formats.iter().find(|f| {
        f.ext.as_deref() == Some("mp4")
            && f.vcodec.as_deref().is_some_and(|codec| codec != "none")
            && f.acodec.as_deref().is_some_and(|codec| codec != "none")
    }) {
        return as_stream(format);
    }

    formats
        .iter()
        .find(|f| f.vcodec.as_deref().is_some_and(|codec| codec != "none"))
        .and_then(as_stream)
}

fn as_stream(format: &DumpedFormat) -> Option<StreamFormat> {
    Some(StreamFormat {
        url: format.url.clone()?,
        format_id: format.format_id.clone().unwrap_or_default(),
    })
}
