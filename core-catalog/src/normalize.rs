//! Episode Normalizer
//!
//! Turns whatever the remote table or an old local snapshot holds in an
//! `episodes` field into canonical [`Episode`] records. Accepted inputs:
//!
//! - a JSON array of loosely-typed episode objects
//! - a string containing such an array (the remote column is text)
//! - anything else, which yields no episodes
//!
//! Nothing here fails: unparseable input degrades to defaults.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{Episode, EPISODE_PLACEHOLDER_TITLE};

/// Episode as found in the wild: every field optional and of any JSON type.
#[derive(Debug, Default, Deserialize)]
pub struct RawEpisode {
    #[serde(default)]
    pub season: Option<Value>,
    #[serde(default)]
    pub episode: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default, rename = "videoUrl")]
    pub video_url: Option<Value>,
    /// Older records used the column spelling
    #[serde(default, rename = "video_url")]
    pub video_url_legacy: Option<Value>,
}

impl RawEpisode {
    /// Non-object values carry no fields and become a default episode.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::deserialize(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    pub fn canonicalize(self) -> Episode {
        let season = parse_int(self.season.as_ref())
            .filter(|n| *n != 0)
            .unwrap_or(1)
            .clamp(1, u32::MAX as i64) as u32;
        let episode = parse_int(self.episode.as_ref())
            .unwrap_or(0)
            .clamp(0, u32::MAX as i64) as u32;

        Episode {
            season,
            episode,
            title: truthy_text(self.title.as_ref())
                .unwrap_or_else(|| EPISODE_PLACEHOLDER_TITLE.to_string()),
            duration: truthy_text(self.duration.as_ref()).unwrap_or_default(),
            description: truthy_text(self.description.as_ref()).unwrap_or_default(),
            video_url: truthy_text(self.video_url.as_ref())
                .or_else(|| truthy_text(self.video_url_legacy.as_ref()))
                .unwrap_or_default(),
        }
    }
}

/// Normalize an `episodes` value of unknown shape.
pub fn normalize_episodes(value: &Value) -> Vec<Episode> {
    match value {
        Value::Array(items) => normalize_list(items),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => normalize_list(&items),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn normalize_list(items: &[Value]) -> Vec<Episode> {
    items
        .iter()
        .map(|item| RawEpisode::from_value(item).canonicalize())
        .collect()
}

/// Episodes for a series: normalized, or the single synthetic episode when
/// there are none and the series has a video URL.
pub fn series_episodes(raw: Option<&Value>, video_url: &str) -> Vec<Episode> {
    let episodes = raw.map(normalize_episodes).unwrap_or_default();
    if episodes.is_empty() && !video_url.is_empty() {
        return vec![synthesize_episode(video_url)];
    }
    episodes
}

pub fn synthesize_episode(video_url: &str) -> Episode {
    Episode::synthetic(video_url)
}

/// Leading-integer parse: `"3"`, `" 12abc"`, `4.9` and `"-2"` all yield a
/// number; `"abc"`, `null`, booleans and containers do not.
pub fn parse_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first()? {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // Too many digits saturates rather than failing
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Text for values that count as "present": non-empty strings, non-zero
/// numbers, `true` and containers. Absent, null, `""`, `0` and `false`
/// yield `None`.
pub fn truthy_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Text for values that are merely present: only absent or null yield `None`.
pub fn present_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
