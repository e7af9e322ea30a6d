use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Path to the yt-dlp executable.
    pub executable: String,
    /// Number of results returned by a keyword search.
    pub search_limit: u32,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            executable: "yt-dlp".to_string(),
            search_limit: 20,
        }
    }
}
