//! Domain models for the catalog
//!
//! Canonical types only: every value of these types has already been through
//! defaulting and episode normalization. Loosely-typed inputs live in
//! [`crate::rows`], [`crate::normalize`] and [`crate::snapshot`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

/// Placeholder title for episodes without one
pub const EPISODE_PLACEHOLDER_TITLE: &str = "Épisode";

/// Sentinel for missing duration/year/genre labels
pub const MISSING_LABEL: &str = "-";

// =============================================================================
// Category
// =============================================================================

/// Catalog section; also the remote `type` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Film,
    Serie,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Film, Category::Serie];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Film => "film",
            Category::Serie => "serie",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "film" => Ok(Category::Film),
            "serie" => Ok(Category::Serie),
            other => Err(CatalogError::InvalidCategory(other.to_string())),
        }
    }
}

// =============================================================================
// Episode
// =============================================================================

/// A single episode of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Always >= 1
    pub season: u32,
    pub episode: u32,
    pub title: String,
    pub duration: String,
    pub description: String,
    pub video_url: String,
}

impl Episode {
    pub fn new(season: u32, episode: u32, title: impl Into<String>) -> Self {
        Self {
            season,
            episode,
            title: title.into(),
            duration: String::new(),
            description: String::new(),
            video_url: String::new(),
        }
    }

    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = url.into();
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    /// The episode derived from a series' legacy single video URL
    pub fn synthetic(video_url: impl Into<String>) -> Self {
        Self::new(1, 1, "Épisode 1").with_video_url(video_url)
    }

    /// Apply the normalizer rules to an already typed episode.
    pub fn canonical(mut self) -> Self {
        if self.season == 0 {
            self.season = 1;
        }
        if self.title.is_empty() {
            self.title = EPISODE_PLACEHOLDER_TITLE.to_string();
        }
        self
    }
}

impl Default for Episode {
    fn default() -> Self {
        Self::new(1, 0, EPISODE_PLACEHOLDER_TITLE)
    }
}

// =============================================================================
// Items
// =============================================================================

/// A film entry (and the common part of a series entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub video_url: String,
    pub duration: String,
    pub year: String,
    pub genre: String,
}

impl ContentItem {
    /// Item with sentinel labels and empty text fields
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            image: String::new(),
            video_url: String::new(),
            duration: MISSING_LABEL.to_string(),
            year: MISSING_LABEL.to_string(),
            genre: MISSING_LABEL.to_string(),
        }
    }
}

/// A series entry: item fields plus an ordered episode list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesItem {
    #[serde(flatten)]
    pub item: ContentItem,
    pub episodes: Vec<Episode>,
}

impl SeriesItem {
    /// Build a series, deriving the synthetic episode when needed.
    pub fn new(item: ContentItem, episodes: Vec<Episode>) -> Self {
        let mut series = Self { item, episodes };
        series.ensure_episodes();
        series
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// A series with a video URL is never left without episodes.
    pub fn ensure_episodes(&mut self) {
        if self.episodes.is_empty() && !self.item.video_url.is_empty() {
            self.episodes.push(Episode::synthetic(self.item.video_url.clone()));
        }
    }
}

/// Either kind of catalog entry, as returned by single-item lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CatalogItem {
    Film(ContentItem),
    Serie(SeriesItem),
}

impl CatalogItem {
    pub fn category(&self) -> Category {
        match self {
            CatalogItem::Film(_) => Category::Film,
            CatalogItem::Serie(_) => Category::Serie,
        }
    }

    pub fn item(&self) -> &ContentItem {
        match self {
            CatalogItem::Film(item) => item,
            CatalogItem::Serie(series) => &series.item,
        }
    }

    pub fn id(&self) -> &str {
        &self.item().id
    }
}

// =============================================================================
// Cache
// =============================================================================

/// The full catalog snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCache {
    pub films: Vec<ContentItem>,
    pub series: Vec<SeriesItem>,
}

impl ContentCache {
    pub fn new(films: Vec<ContentItem>, series: Vec<SeriesItem>) -> Self {
        Self { films, series }
    }

    pub fn is_empty(&self) -> bool {
        self.films.is_empty() && self.series.is_empty()
    }

    pub fn len(&self, category: Category) -> usize {
        match category {
            Category::Film => self.films.len(),
            Category::Serie => self.series.len(),
        }
    }

    pub fn find(&self, category: Category, id: &str) -> Option<CatalogItem> {
        match category {
            Category::Film => self
                .films
                .iter()
                .find(|f| f.id == id)
                .cloned()
                .map(CatalogItem::Film),
            Category::Serie => self
                .series
                .iter()
                .find(|s| s.id() == id)
                .cloned()
                .map(CatalogItem::Serie),
        }
    }

    pub fn contains(&self, category: Category, id: &str) -> bool {
        match category {
            Category::Film => self.films.iter().any(|f| f.id == id),
            Category::Serie => self.series.iter().any(|s| s.id() == id),
        }
    }

    pub fn push(&mut self, entry: CatalogItem) {
        match entry {
            CatalogItem::Film(item) => self.films.push(item),
            CatalogItem::Serie(series) => self.series.push(series),
        }
    }

    /// Remove every entry with `id`; returns how many were removed.
    pub fn remove(&mut self, category: Category, id: &str) -> usize {
        match category {
            Category::Film => {
                let before = self.films.len();
                self.films.retain(|f| f.id != id);
                before - self.films.len()
            }
            Category::Serie => {
                let before = self.series.len();
                self.series.retain(|s| s.id() != id);
                before - self.series.len()
            }
        }
    }

    /// Serialized form used for change detection and persistence
    pub fn to_json(&self) -> Result<String, CatalogError> {
        serde_json::to_string(self).map_err(CatalogError::from)
    }
}

// =============================================================================
// Write inputs
// =============================================================================

/// Input for adding an item. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub image: String,
    pub video_url: String,
    pub duration: String,
    pub year: String,
    pub genre: String,
    /// Only meaningful for series
    pub episodes: Vec<Episode>,
}

impl NewItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = url.into();
        self
    }

    pub fn with_labels(
        mut self,
        duration: impl Into<String>,
        year: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        self.duration = duration.into();
        self.year = year.into();
        self.genre = genre.into();
        self
    }

    pub fn with_episodes(mut self, episodes: Vec<Episode>) -> Self {
        self.episodes = episodes;
        self
    }

    /// Episodes that count for `category`, normalized
    pub fn episodes_for(&self, category: Category) -> Vec<Episode> {
        match category {
            Category::Film => Vec::new(),
            Category::Serie => self.episodes.iter().cloned().map(Episode::canonical).collect(),
        }
    }

    /// Primary video URL: first episode's for series with episodes,
    /// otherwise the item's own.
    pub fn primary_video_url(&self, category: Category) -> String {
        self.episodes_for(category)
            .first()
            .map(|ep| ep.video_url.clone())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.video_url.clone())
    }

    /// Canonical item carrying `id`, with sentinel defaults applied
    pub fn to_item(&self, category: Category, id: impl Into<String>) -> ContentItem {
        ContentItem {
            id: id.into(),
            title: self.title.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            video_url: self.primary_video_url(category),
            duration: label_or_sentinel(&self.duration),
            year: label_or_sentinel(&self.year),
            genre: label_or_sentinel(&self.genre),
        }
    }
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
    pub episodes: Option<Vec<Episode>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self == &ItemPatch::default()
    }

    /// Shallow-merge the provided fields into `item`
    pub fn apply_to_item(&self, item: &mut ContentItem) {
        let fields = [
            (&self.title, &mut item.title),
            (&self.description, &mut item.description),
            (&self.image, &mut item.image),
            (&self.video_url, &mut item.video_url),
            (&self.duration, &mut item.duration),
            (&self.year, &mut item.year),
            (&self.genre, &mut item.genre),
        ];
        for (value, target) in fields {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
    }

    /// Shallow-merge into a series; provided episodes replace the list.
    pub fn apply_to_series(&self, series: &mut SeriesItem) {
        self.apply_to_item(&mut series.item);
        if let Some(episodes) = &self.episodes {
            series.episodes = episodes.iter().cloned().map(Episode::canonical).collect();
        }
        series.ensure_episodes();
    }
}

fn label_or_sentinel(value: &str) -> String {
    if value.is_empty() {
        MISSING_LABEL.to_string()
    } else {
        value.to_string()
    }
}
