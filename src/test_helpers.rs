//! Shared test utilities for the maka-gal test suite.
//!
//! Provides record builders and lookup helpers so tests can describe a
//! gallery in a line or two instead of spelling out every field.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let images = vec![
//!     record_with("img-0", "hoodie", &["Kids", "Hoodies"], &["black"]),
//!     record_with("img-1", "jacket", &["Jackets"], &["red"]),
//! ];
//! let mut state = GalleryState::new();
//! state.set_images(images);
//! assert_eq!(ids(state.filtered_images()), vec!["img-0", "img-1"]);
//! ```

use chrono::{TimeZone, Utc};

use crate::types::{ImageRecord, ModerationStatus, UsageClass};

// =========================================================================
// Record builders
// =========================================================================

/// An approved record with default compliance metadata and a `Fashion`
/// category.
pub fn record(id: &str, title: &str) -> ImageRecord {
    ImageRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: "Exclusive fashion piece".to_string(),
        safe_description: "Exclusive fashion piece".to_string(),
        image_path: format!("Assets/{id}.png"),
        thumbnail_path: format!("Assets/{id}.png"),
        badge: "Exclusive".to_string(),
        categories: vec!["Fashion".to_string()],
        tags: vec![],
        color: None,
        garment_type: None,
        license: "CC-BY-4.0".to_string(),
        source: "MAKA Collection".to_string(),
        usage: UsageClass::Commercial,
        moderation_status: ModerationStatus::Approved,
        moderation_issues: vec![],
        date_added: Utc.with_ymd_and_hms(2026, 1, 6, 12, 0, 0).unwrap(),
    }
}

/// A record with explicit categories and tags.
pub fn record_with(id: &str, title: &str, categories: &[&str], tags: &[&str]) -> ImageRecord {
    let mut r = record(id, title);
    r.categories = categories.iter().map(|c| c.to_string()).collect();
    r.tags = tags.iter().map(|t| t.to_string()).collect();
    r
}

/// A flagged record carrying the given issues.
pub fn flagged(id: &str, title: &str, issues: &[&str]) -> ImageRecord {
    let mut r = record(id, title);
    r.moderation_status = ModerationStatus::Flagged;
    r.moderation_issues = issues.iter().map(|i| i.to_string()).collect();
    r
}

/// `count` plain records with ids `img-0..img-{count-1}`.
pub fn numbered(count: usize) -> Vec<ImageRecord> {
    (0..count)
        .map(|i| record(&format!("img-{i}"), &format!("Item {i}")))
        .collect()
}

// =========================================================================
// Extractors
// =========================================================================

/// Ids in order.
pub fn ids(images: &[ImageRecord]) -> Vec<&str> {
    images.iter().map(|i| i.id.as_str()).collect()
}

/// Count non-overlapping occurrences of `needle` in rendered markup.
pub fn count_occurrences(html: &str, needle: &str) -> usize {
    html.matches(needle).count()
}
