use regex::Regex;

/// Artist/track candidate extracted from a video title. `track` is never
/// empty after [`parse`]; `artist` may be.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongInfo {
    pub artist: String,
    pub track: String,
}

/// Split a video title into artist and track.
///
/// The title is first stripped of decorative noise, then matched against
/// `ARTIST《TRACK》` / `ARTIST「TRACK」` (CJK quoting is a stronger delimiter
/// than a dash, which can appear inside either field) and `ARTIST - TRACK`
/// with any common dash. With no separator the whole cleaned title becomes
/// the track.
pub fn parse(video_title: &str) -> SongInfo {
    let cleaned = clean_title(video_title);

    let cjk_quote = Regex::new(r"^(.+?)\s*[《「](.+?)[》」]\s*$").unwrap();
    if let Some(caps) = cjk_quote.captures(&cleaned) {
        return SongInfo {
            artist: caps[1].trim().to_string(),
            track: caps[2].trim().to_string(),
        };
    }

    let dash = Regex::new(r"^(.+?)\s*[-–—]\s*(.+)$").unwrap();
    if let Some(caps) = dash.captures(&cleaned) {
        return SongInfo {
            artist: caps[1].trim().to_string(),
            track: caps[2].trim().to_string(),
        };
    }

    SongInfo {
        artist: String::new(),
        track: cleaned,
    }
}

/// Strip promotional noise from a video title. The patterns run in order;
/// 《》/「」 quoting brackets are deliberately not treated as noise because
/// they carry the artist/track split.
pub fn clean_title(video_title: &str) -> String {
    let patterns = [
        r"(?i)\s*[(\[【].*?(?:官方|official|mv|music video|lyric|歌詞|完整版|高音質|hd|4k|1080p|live|現場|演唱會).*?[)\]】]",
        r"\s*[(\[【].*?[)\]】]",
        r"(?i)\s*[-–—]\s*(?:official|mv|music video|lyric|歌詞).*$",
        r"\s*\|.*$",
        r"\s*/.*$",
        r"\s*官方.*$",
        r"(?i)\s*MV$",
        r"(?i)\s*Official\s*(?:Music\s*)?(?:Video)?$",
    ];

    let mut result = video_title.to_string();
    for pattern in patterns {
        if let Ok(re) = Regex::new(pattern) {
            result = re.replace_all(&result, "").to_string();
        }
    }
    result.trim().to_string()
}

/// True iff any code point falls in the CJK Unified Ideographs block
/// (U+4E00..=U+9FFF). Routes the resolution pipeline to the regional tier.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cjk_quoted_title_splits_outside_inside() {
        let info = parse("周杰倫《晴天》(官方完整版 MV)");
        assert_eq!(info.artist, "周杰倫");
        assert_eq!(info.track, "晴天");

        let info = parse("鄧紫棋「光年之外」");
        assert_eq!(info.artist, "鄧紫棋");
        assert_eq!(info.track, "光年之外");
    }

    #[test]
    fn dashed_title_splits_left_right() {
        let info = parse("Adele - Hello (Official Music Video)");
        assert_eq!(info.artist, "Adele");
        assert_eq!(info.track, "Hello");
    }

    #[test]
    fn en_and_em_dash_variants() {
        assert_eq!(parse("Sia – Chandelier").artist, "Sia");
        assert_eq!(parse("Sia — Chandelier").track, "Chandelier");
    }

    #[test]
    fn no_separator_falls_back_to_whole_title() {
        let info = parse("Symphony No. 9");
        assert_eq!(info.artist, "");
        assert_eq!(info.track, "Symphony No. 9");
    }

    #[test]
    fn cjk_quoting_beats_dash() {
        let info = parse("五月天《乾杯 - 現場版》");
        assert_eq!(info.artist, "五月天");
        assert_eq!(info.track, "乾杯 - 現場版");
    }

    #[test]
    fn strips_trailing_pipe_and_slash_segments() {
        assert_eq!(clean_title("Artist - Song | 4K remaster"), "Artist - Song");
        assert_eq!(clean_title("Artist - Song / audio only"), "Artist - Song");
    }

    #[test]
    fn strips_bare_trailing_mv_and_official_video() {
        assert_eq!(clean_title("Artist - Song MV"), "Artist - Song");
        assert_eq!(clean_title("Artist - Song Official Video"), "Artist - Song");
    }

    #[test]
    fn strips_any_remaining_bracket_group() {
        assert_eq!(clean_title("Artist - Song (acoustic)"), "Artist - Song");
        assert_eq!(clean_title("Artist - Song 【中文字幕】"), "Artist - Song");
    }

    #[test]
    fn cjk_detection() {
        assert!(contains_cjk("周杰倫 晴天"));
        assert!(contains_cjk("mixed 歌 title"));
        assert!(!contains_cjk("Adele - Hello"));
        assert!(!contains_cjk("こんにちは")); // kana only, no unified ideographs
    }
}
