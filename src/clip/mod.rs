//! Clip records
//!
//! A clip record is the data carried by every node of a clip graph. Records are
//! ingested from the clip catalog and validated once, before they can enter a graph.

pub mod search;

pub use search::*;

use serde::{Deserialize, Serialize};

use crate::value_objects::NodeId;

/// Marker the catalog places between the media stem and the preview suffix of a
/// thumbnail url.
const PREVIEW_MARKER: &str = "-preview-";

/// Errors raised while ingesting a clip record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClipIngestError {
    /// The clip id is empty or whitespace
    #[error("Clip id cannot be empty")]
    EmptyId,
    /// The duration is missing, non-finite or not positive
    #[error("Clip {id} has invalid duration {duration}: expected a positive number of seconds")]
    InvalidDuration { id: String, duration: f64 },
}

/// A validated video clip.
///
/// Identity is the clip id. Once built a record is never mutated; graph nodes and
/// timelines hold clones of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedClip", rename_all = "camelCase")]
pub struct ClipRecord {
    id: String,
    title: String,
    broadcaster: String,
    game: String,
    thumbnail_url: String,
    video_url: String,
    duration: f64,
    views: u64,
}

impl ClipRecord {
    /// Create a clip record with the two required fields.
    ///
    /// Display metadata starts empty and can be filled with the `with_*` builders.
    pub fn new(id: impl Into<String>, duration: f64) -> Result<Self, ClipIngestError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ClipIngestError::EmptyId);
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ClipIngestError::InvalidDuration { id, duration });
        }

        Ok(Self {
            id,
            title: String::new(),
            broadcaster: String::new(),
            game: String::new(),
            thumbnail_url: String::new(),
            video_url: String::new(),
            duration,
            views: 0,
        })
    }

    /// Set the clip title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the broadcaster name
    pub fn with_broadcaster(mut self, broadcaster: impl Into<String>) -> Self {
        self.broadcaster = broadcaster.into();
        self
    }

    /// Set the game identifier
    pub fn with_game(mut self, game: impl Into<String>) -> Self {
        self.game = game.into();
        self
    }

    /// Set the thumbnail and video urls
    pub fn with_urls(mut self, thumbnail_url: impl Into<String>, video_url: impl Into<String>) -> Self {
        self.thumbnail_url = thumbnail_url.into();
        self.video_url = video_url.into();
        self
    }

    /// Set the view count
    pub fn with_views(mut self, views: u64) -> Self {
        self.views = views;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The graph node id this clip occupies
    pub fn node_id(&self) -> NodeId {
        NodeId::new(self.id.clone())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn broadcaster(&self) -> &str {
        &self.broadcaster
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn thumbnail_url(&self) -> &str {
        &self.thumbnail_url
    }

    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    /// Duration in seconds, always positive
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn views(&self) -> u64 {
        self.views
    }
}

/// Wire shape of a clip record before validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UncheckedClip {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    broadcaster: String,
    #[serde(default)]
    game: String,
    #[serde(default)]
    thumbnail_url: String,
    #[serde(default)]
    video_url: String,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    views: u64,
}

impl TryFrom<UncheckedClip> for ClipRecord {
    type Error = ClipIngestError;

    fn try_from(raw: UncheckedClip) -> Result<Self, Self::Error> {
        Ok(ClipRecord::new(raw.id, raw.duration)?
            .with_title(raw.title)
            .with_broadcaster(raw.broadcaster)
            .with_game(raw.game)
            .with_urls(raw.thumbnail_url, raw.video_url)
            .with_views(raw.views))
    }
}

/// A clip as returned by the clip catalog, before ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceClip {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub broadcaster_name: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub duration: f64,
}

impl SourceClip {
    /// Derive the playable video url from the thumbnail url.
    ///
    /// Returns `None` when the thumbnail does not carry the preview marker.
    pub fn video_url(&self) -> Option<String> {
        self.thumbnail_url
            .find(PREVIEW_MARKER)
            .map(|cut| format!("{}.mp4", &self.thumbnail_url[..cut]))
    }
}

impl TryFrom<SourceClip> for ClipRecord {
    type Error = ClipIngestError;

    fn try_from(clip: SourceClip) -> Result<Self, Self::Error> {
        let video_url = clip.video_url().unwrap_or_default();
        Ok(ClipRecord::new(clip.id, clip.duration)?
            .with_title(clip.title)
            .with_broadcaster(clip.broadcaster_name)
            .with_game(clip.game_id)
            .with_urls(clip.thumbnail_url, video_url)
            .with_views(clip.view_count))
    }
}

/// Where a clip sits within a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipPlacement {
    Start,
    Middle,
    End,
}

impl ClipPlacement {
    /// Placement of the `index`-th clip of a sequence of `len` clips.
    ///
    /// A single clip is both first and last and is reported as `Start`.
    pub fn for_index(index: usize, len: usize) -> Self {
        if index == 0 {
            ClipPlacement::Start
        } else if index + 1 >= len {
            ClipPlacement::End
        } else {
            ClipPlacement::Middle
        }
    }
}
