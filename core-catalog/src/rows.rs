//! Remote table rows
//!
//! Shapes exchanged with the remote `content` table and their mapping to
//! canonical items.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{
    Category, ContentItem, Episode, ItemPatch, NewItem, SeriesItem, MISSING_LABEL,
};
use crate::normalize::{present_text, series_episodes, truthy_text};

/// A row as returned by the remote table. Every column is optional and
/// loosely typed; identifiers may be numeric.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContentRow {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default)]
    pub video_url: Option<Value>,
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub genre: Option<Value>,
    /// Text-serialized episode list (series only)
    #[serde(default)]
    pub episodes: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
}

impl ContentRow {
    pub fn to_film_item(&self) -> ContentItem {
        ContentItem {
            id: self.id.clone(),
            title: present_text(self.title.as_ref()).unwrap_or_default(),
            description: truthy_text(self.description.as_ref()).unwrap_or_default(),
            image: truthy_text(self.image.as_ref()).unwrap_or_default(),
            video_url: present_text(self.video_url.as_ref()).unwrap_or_default(),
            duration: label(self.duration.as_ref()),
            year: label(self.year.as_ref()),
            genre: label(self.genre.as_ref()),
        }
    }

    /// Series item with normalized (or synthesized) episodes
    pub fn to_series_item(&self) -> SeriesItem {
        let item = self.to_film_item();
        let episodes = series_episodes(self.episodes.as_ref(), &item.video_url);
        SeriesItem { item, episodes }
    }
}

fn label(value: Option<&Value>) -> String {
    truthy_text(value).unwrap_or_else(|| MISSING_LABEL.to_string())
}

/// Accepts string or numeric identifiers; null or absent becomes empty.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value_to_id(value.as_ref()))
}

pub fn value_to_id(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Body of an insert request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewContentRow {
    #[serde(rename = "type")]
    pub kind: Category,
    pub title: String,
    pub description: String,
    pub image: String,
    pub video_url: String,
    pub duration: String,
    pub year: String,
    pub genre: String,
    /// Episode list serialized to text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<String>,
}

impl NewContentRow {
    pub fn from_new_item(category: Category, item: &NewItem) -> serde_json::Result<Self> {
        let defaults = item.to_item(category, "");
        let episodes = item.episodes_for(category);
        let episodes = if episodes.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&episodes)?)
        };

        Ok(Self {
            kind: category,
            title: defaults.title,
            description: defaults.description,
            image: defaults.image,
            video_url: defaults.video_url,
            duration: defaults.duration,
            year: defaults.year,
            genre: defaults.genre,
            episodes,
        })
    }
}

/// Body of a patch request: only the provided fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentPatchRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<String>,
}

impl ContentPatchRow {
    /// Build the patch body. With episodes provided and no usable video
    /// URL, the first episode's URL becomes the primary one.
    pub fn from_patch(patch: &ItemPatch) -> serde_json::Result<Self> {
        let episodes: Option<Vec<Episode>> = patch
            .episodes
            .as_ref()
            .map(|eps| eps.iter().cloned().map(Episode::canonical).collect());

        let mut video_url = patch.video_url.clone();
        if let Some(first) = episodes.as_ref().and_then(|eps| eps.first()) {
            if video_url.as_deref().map(str::is_empty).unwrap_or(true) {
                video_url = Some(first.video_url.clone());
            }
        }

        Ok(Self {
            title: patch.title.clone(),
            description: patch.description.clone(),
            image: patch.image.clone(),
            video_url,
            duration: patch.duration.clone(),
            year: patch.year.clone(),
            genre: patch.genre.clone(),
            episodes: episodes.map(|eps| serde_json::to_string(&eps)).transpose()?,
        })
    }
}
