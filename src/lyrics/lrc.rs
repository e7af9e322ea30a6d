//! LRC timed-lyrics codec: `[mm:ss.xx]` lines in, timed captions or plain
//! text out. Plain-text conversion never reorders lines.

use regex::Regex;

use crate::api::models::TimedCaption;

/// Tail padding for the last caption, which has no successor to end on.
const TAIL_PADDING_SECS: f64 = 5.0;
/// Per-line duration when no real timing is available and captions are
/// evenly estimated.
const ESTIMATED_LINE_SECS: f64 = 3.5;

/// Parse LRC content into timed captions.
///
/// A line yields a caption when it starts with a `[m:ss.xx]` timestamp
/// (2-digit fractions are centiseconds) and has non-empty trailing text.
/// Metadata headers like `[ti:...]` and empty-text lines are ignored. Each
/// caption ends where the next one starts; the last gets fixed tail padding.
pub fn parse(raw: &str) -> Vec<TimedCaption> {
    let timed_line = Regex::new(r"^\[(\d{1,2}):(\d{2})[.:,](\d{1,3})\]\s*(.+)$").unwrap();

    let mut captions = Vec::new();
    for line in raw.lines() {
        let Some(caps) = timed_line.captures(line.trim()) else {
            continue;
        };

        let minutes: u64 = caps[1].parse().unwrap_or(0);
        let seconds: u64 = caps[2].parse().unwrap_or(0);
        let frac = &caps[3];
        let mut millis: u64 = frac.parse().unwrap_or(0);
        if frac.len() == 2 {
            millis *= 10;
        }

        let text = caps[4].trim();
        if text.is_empty() {
            continue;
        }

        captions.push(TimedCaption {
            start: minutes as f64 * 60.0 + seconds as f64 + millis as f64 / 1000.0,
            end: 0.0,
            text: text.to_string(),
        });
    }

    let count = captions.len();
    for i in 0..count {
        let end = if i + 1 < count {
            captions[i + 1].start
        } else {
            captions[i].start + TAIL_PADDING_SECS
        };
        captions[i].end = end;
    }

    captions
}

/// Degrade timed (or already-plain) lyrics to plain text: strip timestamp
/// prefixes, drop bare `[...]` metadata lines and lines left empty, keep
/// everything else in original order.
pub fn to_plain_text(raw: &str) -> String {
    let stamp = Regex::new(r"\[\d{1,2}:\d{2}[.:,]?\d{0,3}\]").unwrap();
    let metadata = Regex::new(r"^\[.*\]$").unwrap();

    let mut lines = Vec::new();
    for line in raw.lines() {
        let trimmed = line.trim();
        let stripped = stamp.replace_all(trimmed, "");
        let text = stripped.trim();
        if text.is_empty() || metadata.is_match(trimmed) {
            continue;
        }
        lines.push(text.to_string());
    }
    lines.join("\n")
}

/// Serialize captions back to LRC (`[mm:ss.xx]text` per line).
pub fn serialize(captions: &[TimedCaption]) -> String {
    captions
        .iter()
        .map(|caption| {
            let minutes = (caption.start / 60.0).floor() as u64;
            let seconds = caption.start - minutes as f64 * 60.0;
            let whole = seconds.floor() as u64;
            let hundredths = ((seconds - whole as f64) * 100.0).round() as u64;
            format!("[{:02}:{:02}.{:02}]{}", minutes, whole, hundredths, caption.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Evenly-spaced captions for plain lyrics with no real timing: each
/// non-empty line spans a fixed 3.5 seconds.
pub fn estimate(plain: &str) -> Vec<TimedCaption> {
    plain
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, text)| TimedCaption {
            start: i as f64 * ESTIMATED_LINE_SECS,
            end: (i + 1) as f64 * ESTIMATED_LINE_SECS,
            text: text.to_string(),
        })
        .collect()
}
