use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::api::models::{LyricsResult, LyricsSource};
use crate::configs::LyricsConfig;
use crate::store::{Store, search_key};

pub mod genius;
pub mod kugou;
pub mod lrc;
pub mod lrclib;
pub mod lyrics_ovh;
pub mod netease;
pub mod qqmusic;
pub mod title;

use self::genius::GeniusProvider;
use self::kugou::KugouProvider;
use self::lrclib::LrcLibProvider;
use self::lyrics_ovh::LyricsOvhProvider;
use self::netease::NeteaseProvider;
use self::qqmusic::QqMusicProvider;

/// A result must have more non-empty lines than this to count as real
/// lyrics; instrumental and placeholder entries come back shorter.
const MIN_LYRIC_LINES: usize = 3;

#[async_trait]
pub trait LyricsProvider: Send + Sync {
    fn name(&self) -> &'static str;
    /// Soft-miss contract: network errors, bad statuses and unparseable
    /// responses are all `None`, never an error.
    async fn fetch(&self, artist: &str, track: &str) -> Option<LyricsResult>;
}

/// Outcome of one resolution. `from_cache` only marks a cache hit; fresh
/// results have already been written through by the time they are returned.
pub struct Resolution {
    pub result: LyricsResult,
    pub from_cache: bool,
}

pub struct LyricsResolver {
    general: Vec<Arc<dyn LyricsProvider>>,
    regional: Vec<Arc<dyn LyricsProvider>>,
    store: Arc<Store>,
    provider_timeout: Duration,
    resolve_timeout: Duration,
}

impl LyricsResolver {
    pub fn new(config: &LyricsConfig, store: Arc<Store>) -> Self {
        let mut general: Vec<Arc<dyn LyricsProvider>> = Vec::new();
        let mut regional: Vec<Arc<dyn LyricsProvider>> = Vec::new();

        macro_rules! register_provider {
            ($tier:expr, $enabled:expr, $name:literal, $ctor:expr) => {
                if $enabled {
                    $tier.push(Arc::new($ctor));
                    tracing::info!("Loaded lyrics provider: {}", $name);
                }
            };
        }

        register_provider!(general, config.lrclib, "LRCLib", LrcLibProvider::new());
        register_provider!(general, config.genius, "Genius", GeniusProvider::new());
        register_provider!(general, config.lyrics_ovh, "lyrics.ovh", LyricsOvhProvider::new());
        register_provider!(regional, config.netease, "NetEase", NeteaseProvider::new());
        register_provider!(regional, config.qqmusic, "QQ Music", QqMusicProvider::new());
        register_provider!(regional, config.kugou, "Kugou", KugouProvider::new());

        Self::with_providers(
            general,
            regional,
            store,
            Duration::from_secs(config.provider_timeout_secs),
            Duration::from_secs(config.resolve_timeout_secs),
        )
    }

    pub fn with_providers(
        general: Vec<Arc<dyn LyricsProvider>>,
        regional: Vec<Arc<dyn LyricsProvider>>,
        store: Arc<Store>,
        provider_timeout: Duration,
        resolve_timeout: Duration,
    ) -> Self {
        Self {
            general,
            regional,
            store,
            provider_timeout,
            resolve_timeout,
        }
    }

    /// Resolve lyrics for a video. Never fails: an exhausted chain yields a
    /// `LyricsSource::None` result, which is not cached so later retries can
    /// still succeed.
    pub async fn resolve(
        &self,
        video_id: &str,
        video_title: &str,
        artist_hint: &str,
        track_hint: &str,
    ) -> Resolution {
        if let Some(cached) = self.cached(video_id).await {
            tracing::info!("lyrics cache hit for {}: {}", video_id, cached.source);
            return Resolution {
                result: LyricsResult {
                    artist: cached.artist,
                    track: cached.track,
                    source: LyricsSource::from_name(&cached.source),
                    text: cached.lyrics_text,
                },
                from_cache: true,
            };
        }

        let mut artist = artist_hint.trim().to_string();
        let mut track = track_hint.trim().to_string();
        if artist.is_empty() || track.is_empty() {
            let parsed = title::parse(video_title);
            if artist.is_empty() {
                artist = parsed.artist;
            }
            if track.is_empty() {
                track = parsed.track;
            }
        }

        let key = {
            let key = search_key(&artist, &track);
            if key.is_empty() {
                video_title.to_string()
            } else {
                key
            }
        };
        if let Some(manual) = self.manual(&key).await {
            tracing::info!("manual lyrics hit for '{}'", key);
            let result = LyricsResult {
                artist: manual.artist,
                track: manual.track,
                source: LyricsSource::Manual,
                text: manual.lyrics_text,
            };
            self.write_cache(video_id, video_title, &result).await;
            return Resolution {
                result,
                from_cache: false,
            };
        }

        let deadline = Instant::now() + self.resolve_timeout;
        let mut found = self.scan_tiers(video_title, &artist, &track, deadline).await;

        // Narrowing retry: a wrong or unknown-to-the-catalog artist gives
        // false negatives, so a full-chain miss repeats track-only.
        if found.is_none() && !artist.is_empty() {
            tracing::debug!("no lyrics for '{} {}', retrying track-only", artist, track);
            found = self.scan_tiers(video_title, "", &track, deadline).await;
        }

        match found {
            Some(result) => {
                self.write_cache(video_id, video_title, &result).await;
                Resolution {
                    result,
                    from_cache: false,
                }
            }
            None => {
                tracing::info!("no lyrics found for '{}'", video_title);
                Resolution {
                    result: LyricsResult {
                        artist,
                        track,
                        source: LyricsSource::None,
                        text: String::new(),
                    },
                    from_cache: false,
                }
            }
        }
    }

    /// CJK titles go to the regional catalogs first; everything else starts
    /// with the general providers and keeps the regional tier as catch-all.
    async fn scan_tiers(
        &self,
        video_title: &str,
        artist: &str,
        track: &str,
        deadline: Instant,
    ) -> Option<LyricsResult> {
        let (first, second) = if title::contains_cjk(video_title) {
            (&self.regional, &self.general)
        } else {
            (&self.general, &self.regional)
        };

        if let Some(result) = self.scan(first, artist, track, deadline).await {
            return Some(result);
        }
        self.scan(second, artist, track, deadline).await
    }

    async fn scan(
        &self,
        providers: &[Arc<dyn LyricsProvider>],
        artist: &str,
        track: &str,
        deadline: Instant,
    ) -> Option<LyricsResult> {
        for provider in providers {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!("resolution deadline reached, skipping remaining providers");
                return None;
            }
            let budget = remaining.min(self.provider_timeout);

            match tokio::time::timeout(budget, provider.fetch(artist, track)).await {
                Ok(Some(result)) if non_empty_lines(&result.text) > MIN_LYRIC_LINES => {
                    tracing::info!(
                        "{} found lyrics: {} - {}",
                        provider.name(),
                        result.artist,
                        result.track
                    );
                    return Some(result);
                }
                Ok(Some(_)) => {
                    tracing::debug!("{} result too short, treating as miss", provider.name());
                }
                Ok(None) => {
                    tracing::debug!("{}: no lyrics for '{} {}'", provider.name(), artist, track);
                }
                Err(_) => {
                    tracing::debug!("{} timed out after {:?}", provider.name(), budget);
                }
            }
        }
        None
    }

    async fn cached(&self, video_id: &str) -> Option<crate::store::CachedLyrics> {
        let store = self.store.clone();
        let id = video_id.to_string();
        match tokio::task::spawn_blocking(move || store.cached_lyrics(&id)).await {
            Ok(Ok(hit)) => hit,
            Ok(Err(err)) => {
                tracing::warn!("lyrics cache read failed, treating as miss: {}", err);
                None
            }
            Err(err) => {
                tracing::warn!("cache lookup task failed: {}", err);
                None
            }
        }
    }

    async fn manual(&self, key: &str) -> Option<crate::store::ManualLyrics> {
        let store = self.store.clone();
        let key = key.to_string();
        match tokio::task::spawn_blocking(move || store.manual_lyrics(&key)).await {
            Ok(Ok(hit)) => hit,
            Ok(Err(err)) => {
                tracing::warn!("manual lyrics read failed, treating as miss: {}", err);
                None
            }
            Err(err) => {
                tracing::warn!("manual lookup task failed: {}", err);
                None
            }
        }
    }

    /// Write-through; a failure degrades to returning the result uncached.
    async fn write_cache(&self, video_id: &str, video_title: &str, result: &LyricsResult) {
        let store = self.store.clone();
        let id = video_id.to_string();
        let title = video_title.to_string();
        let (artist, track) = (result.artist.clone(), result.track.clone());
        let source = result.source.as_str();
        let text = result.text.clone();
        match tokio::task::spawn_blocking(move || {
            store.save_lyrics(&id, &title, &artist, &track, source, &text)
        })
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!("failed to cache lyrics for {}: {}", video_id, err),
            Err(err) => tracing::warn!("cache write task failed: {}", err),
        }
    }
}

fn non_empty_lines(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    const FIVE_LINES: &str = "line one\nline two\nline three\nline four\nline five";

    struct StubProvider {
        name: &'static str,
        source: LyricsSource,
        text: Option<&'static str>,
        track_only: bool,
    }

    impl StubProvider {
        fn hit(
            name: &'static str,
            source: LyricsSource,
            text: &'static str,
        ) -> Arc<dyn LyricsProvider> {
            Arc::new(Self {
                name,
                source,
                text: Some(text),
                track_only: false,
            })
        }

        fn miss(name: &'static str) -> Arc<dyn LyricsProvider> {
            Arc::new(Self {
                name,
                source: LyricsSource::None,
                text: None,
                track_only: false,
            })
        }
    }

    #[async_trait]
    impl LyricsProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(&self, artist: &str, track: &str) -> Option<LyricsResult> {
            if self.track_only && !artist.is_empty() {
                return None;
            }
            self.text.map(|text| LyricsResult {
                artist: "Resolved Artist".to_string(),
                track: track.to_string(),
                source: self.source,
                text: text.to_string(),
            })
        }
    }

    fn memory_store() -> Arc<Store> {
        Arc::new(Store::open(Path::new(":memory:")).expect("open in-memory store"))
    }

    fn resolver(
        general: Vec<Arc<dyn LyricsProvider>>,
        regional: Vec<Arc<dyn LyricsProvider>>,
        store: Arc<Store>,
    ) -> LyricsResolver {
        LyricsResolver::with_providers(
            general,
            regional,
            store,
            Duration::from_secs(5),
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn cache_wins_over_manual_override() {
        let store = memory_store();
        store
            .save_lyrics("vid1", "Adele - Hello", "Adele", "Hello", "lrclib", "cached text")
            .expect("seed cache");
        store
            .save_manual("Adele", "Hello", "override text")
            .expect("seed override");

        let resolver = resolver(vec![], vec![], store);
        let resolution = resolver.resolve("vid1", "Adele - Hello", "", "").await;

        assert!(resolution.from_cache);
        assert_eq!(resolution.result.text, "cached text");
        assert_eq!(resolution.result.source, LyricsSource::Lrclib);
    }

    #[tokio::test]
    async fn manual_override_beats_providers_and_writes_through() {
        let store = memory_store();
        store
            .save_manual("Adele", "Hello", "override text")
            .expect("seed override");

        let resolver = resolver(
            vec![StubProvider::hit("lrclib", LyricsSource::Lrclib, FIVE_LINES)],
            vec![],
            store.clone(),
        );
        let resolution = resolver.resolve("vid2", "Adele - Hello", "", "").await;

        assert!(!resolution.from_cache);
        assert_eq!(resolution.result.source, LyricsSource::Manual);
        assert_eq!(resolution.result.text, "override text");

        let cached = store
            .cached_lyrics("vid2")
            .expect("lookup")
            .expect("written through");
        assert_eq!(cached.source, "manual");
    }

    #[tokio::test]
    async fn falls_back_to_third_provider_and_caches() {
        let store = memory_store();
        let resolver = resolver(
            vec![
                StubProvider::miss("lrclib"),
                StubProvider::miss("genius"),
                StubProvider::hit("lyrics.ovh", LyricsSource::LyricsOvh, FIVE_LINES),
            ],
            vec![],
            store.clone(),
        );

        let resolution = resolver.resolve("vid3", "Adele - Hello", "", "").await;
        assert_eq!(resolution.result.source, LyricsSource::LyricsOvh);
        assert_eq!(resolution.result.text, FIVE_LINES);

        let cached = store
            .cached_lyrics("vid3")
            .expect("lookup")
            .expect("cached after resolution");
        assert_eq!(cached.source, "lyrics_ovh");
        assert_eq!(cached.lyrics_text, FIVE_LINES);
    }

    #[tokio::test]
    async fn two_line_result_is_rejected() {
        let store = memory_store();
        let resolver = resolver(
            vec![StubProvider::hit("lrclib", LyricsSource::Lrclib, "one\ntwo")],
            vec![],
            store.clone(),
        );

        let resolution = resolver.resolve("vid4", "Adele - Hello", "", "").await;
        assert_eq!(resolution.result.source, LyricsSource::None);
        assert!(resolution.result.text.is_empty());
        assert!(store.cached_lyrics("vid4").expect("lookup").is_none());
    }

    #[tokio::test]
    async fn miss_is_not_cached() {
        let store = memory_store();
        let resolver = resolver(vec![StubProvider::miss("lrclib")], vec![], store.clone());

        let resolution = resolver.resolve("vid5", "Adele - Hello", "", "").await;
        assert_eq!(resolution.result.source, LyricsSource::None);
        assert_eq!(resolution.result.artist, "Adele");
        assert_eq!(resolution.result.track, "Hello");
        assert!(store.cached_lyrics("vid5").expect("lookup").is_none());
    }

    #[tokio::test]
    async fn narrowing_retry_clears_artist() {
        let store = memory_store();
        let track_only: Arc<dyn LyricsProvider> = Arc::new(StubProvider {
            name: "lrclib",
            source: LyricsSource::Lrclib,
            text: Some(FIVE_LINES),
            track_only: true,
        });
        let resolver = resolver(vec![track_only], vec![], store);

        let resolution = resolver
            .resolve("vid6", "Wrong Artist - Hello", "Wrong Artist", "Hello")
            .await;
        assert_eq!(resolution.result.source, LyricsSource::Lrclib);
        assert_eq!(resolution.result.text, FIVE_LINES);
    }

    #[tokio::test]
    async fn cjk_title_prefers_regional_tier() {
        let store = memory_store();
        let resolver = resolver(
            vec![StubProvider::hit("lrclib", LyricsSource::Lrclib, FIVE_LINES)],
            vec![StubProvider::hit("netease", LyricsSource::Netease, FIVE_LINES)],
            store,
        );

        let resolution = resolver.resolve("vid7", "周杰倫《晴天》", "", "").await;
        assert_eq!(resolution.result.source, LyricsSource::Netease);

        let resolution = resolver.resolve("vid8", "Adele - Hello", "", "").await;
        assert_eq!(resolution.result.source, LyricsSource::Lrclib);
    }
}
