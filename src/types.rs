//! Shared types used across the gallery pipeline.
//!
//! [`ImageRecord`] is produced by the loader, owned by
//! [`GalleryState`](crate::state::GalleryState), rendered by the UI and
//! serialized into `gallery.json` by the site generator, so every stage
//! agrees on one shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned when filename detection finds nothing.
pub const FALLBACK_CATEGORY: &str = "Fashion";

/// Sentinel selection value meaning "do not filter on this field".
pub const ALL: &str = "all";

/// An enriched catalog entry: metadata extracted, defaults filled, moderated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// `img-<n>` where `n` is the zero-based position in the catalog.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Description with banned words redacted and attribution appended.
    pub safe_description: String,
    pub image_path: String,
    pub thumbnail_path: String,
    pub badge: String,
    /// Never empty; falls back to [`FALLBACK_CATEGORY`].
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub garment_type: Option<String>,
    pub license: String,
    pub source: String,
    pub usage: UsageClass,
    pub moderation_status: ModerationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub moderation_issues: Vec<String>,
    pub date_added: DateTime<Utc>,
}

impl ImageRecord {
    pub fn is_flagged(&self) -> bool {
        self.moderation_status == ModerationStatus::Flagged
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// Outcome of content review for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Approved,
    Flagged,
    Pending,
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Approved => "approved",
            Self::Flagged => "flagged",
            Self::Pending => "pending",
        })
    }
}

/// Intended use of an image, checked against its license.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageClass {
    #[default]
    Commercial,
    Editorial,
    Personal,
}

/// Layout of the gallery grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
    Masonry,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Grid, ViewMode::List, ViewMode::Masonry];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
            Self::Masonry => "masonry",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Grid => "Grid View",
            Self::List => "List View",
            Self::Masonry => "Masonry View",
        }
    }

    /// Parse a select value. Unknown values fall back to grid.
    pub fn parse(value: &str) -> Self {
        match value {
            "list" => Self::List,
            "masonry" => Self::Masonry,
            _ => Self::Grid,
        }
    }
}
