use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LyricsConfig {
    pub lrclib: bool,
    pub genius: bool,
    pub lyrics_ovh: bool,
    pub netease: bool,
    pub qqmusic: bool,
    pub kugou: bool,
    /// Budget for a single provider round trip.
    pub provider_timeout_secs: u64,
    /// Overall deadline for one resolution, covering both tiers and the
    /// narrowing retry.
    pub resolve_timeout_secs: u64,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            lrclib: true,
            genius: true,
            lyrics_ovh: true,
            netease: true,
            qqmusic: true,
            kugou: true,
            provider_timeout_secs: 10,
            resolve_timeout_secs: 30,
        }
    }
}
