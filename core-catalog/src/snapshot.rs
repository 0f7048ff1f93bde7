//! Lenient view of the locally persisted catalog
//!
//! Snapshots may have been written by older versions with missing fields,
//! numeric identifiers or episodes stored as text. [`RawSnapshot`] accepts
//! all of that; [`RawSnapshot::into_cache`] canonicalizes it.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{ContentCache, ContentItem, SeriesItem, MISSING_LABEL};
use crate::normalize::{normalize_episodes, present_text, series_episodes, truthy_text};
use crate::rows::value_to_id;

/// Top-level snapshot document: `{ "films": [...], "series": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(default, deserialize_with = "list_or_empty")]
    pub films: Vec<Value>,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub series: Vec<Value>,
}

fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    })
}

/// One persisted entry, every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default, rename = "videoUrl")]
    pub video_url: Option<Value>,
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub genre: Option<Value>,
    #[serde(default)]
    pub episodes: Option<Value>,
}

impl RawItem {
    /// `None` for non-object entries
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(_) => Self::deserialize(value).ok(),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<String> {
        match &self.id {
            None | Some(Value::Null) => None,
            id => Some(value_to_id(id.as_ref())),
        }
    }

    /// Description when it counts as present (non-empty)
    pub fn description(&self) -> Option<String> {
        truthy_text(self.description.as_ref())
    }

    /// Local episodes worth adopting: a non-empty list, normalized.
    /// Text-encoded lists are not adopted.
    pub fn adoptable_episodes(&self) -> Option<Vec<crate::models::Episode>> {
        match &self.episodes {
            Some(value @ Value::Array(items)) if !items.is_empty() => {
                Some(normalize_episodes(value))
            }
            _ => None,
        }
    }

    /// Absent fields take their defaults; present values are kept as-is.
    fn to_item(&self, id: String) -> ContentItem {
        let text = |v: &Option<Value>| present_text(v.as_ref()).unwrap_or_default();
        let label =
            |v: &Option<Value>| present_text(v.as_ref()).unwrap_or_else(|| MISSING_LABEL.into());

        ContentItem {
            id,
            title: text(&self.title),
            description: text(&self.description),
            image: text(&self.image),
            video_url: text(&self.video_url),
            duration: label(&self.duration),
            year: label(&self.year),
            genre: label(&self.genre),
        }
    }
}

impl RawSnapshot {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn film_entries(&self) -> impl Iterator<Item = RawItem> + '_ {
        self.films.iter().filter_map(RawItem::from_value)
    }

    pub fn series_entries(&self) -> impl Iterator<Item = RawItem> + '_ {
        self.series.iter().filter_map(RawItem::from_value)
    }

    /// Canonical cache: entries without identifiers are dropped, series
    /// episodes normalized (or synthesized from the video URL).
    pub fn into_cache(self) -> ContentCache {
        let films = self
            .film_entries()
            .filter_map(|raw| match raw.id() {
                Some(id) => Some(raw.to_item(id)),
                None => {
                    warn!("Dropping persisted film without identifier");
                    None
                }
            })
            .collect();

        let series = self
            .series_entries()
            .filter_map(|raw| match raw.id() {
                Some(id) => {
                    let item = raw.to_item(id);
                    let episodes = series_episodes(raw.episodes.as_ref(), &item.video_url);
                    Some(SeriesItem { item, episodes })
                }
                None => {
                    warn!("Dropping persisted series without identifier");
                    None
                }
            })
            .collect();

        ContentCache { films, series }
    }
}
