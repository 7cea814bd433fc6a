//! Gallery state: the loaded records and the current filter selection.
//!
//! [`GalleryState`] is owned by exactly one [`GalleryUI`](crate::ui::GalleryUI).
//! It holds the full record list, a category index derived from it, and
//! the filtered view. Filtering is a pure function of the full list and the
//! selection; `all_images` is only ever replaced by [`GalleryState::set_images`].

use crate::types::{ALL, ImageRecord, ViewMode};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// The user's current filter choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    /// Committed search text. Empty means no search filter.
    pub search: String,
    /// Category name, or `"all"`.
    pub category: String,
    /// Exact license, or `"all"`.
    pub license: String,
    pub view_mode: ViewMode,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL.to_string(),
            license: ALL.to_string(),
            view_mode: ViewMode::Grid,
        }
    }
}

impl FilterSelection {
    /// True when no filter narrows the set.
    pub fn is_unfiltered(&self) -> bool {
        self.search.trim().is_empty() && self.category == ALL && self.license == ALL
    }
}

#[derive(Debug, Default)]
pub struct GalleryState {
    all_images: Vec<ImageRecord>,
    category_index: BTreeMap<String, Vec<usize>>,
    filtered_images: Vec<ImageRecord>,
    selection: FilterSelection,
    last_updated: Option<DateTime<Utc>>,
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record list, rebuild the category index and show
    /// everything.
    pub fn set_images(&mut self, images: Vec<ImageRecord>) {
        self.category_index.clear();
        for (idx, image) in images.iter().enumerate() {
            for category in &image.categories {
                self.category_index
                    .entry(category.clone())
                    .or_default()
                    .push(idx);
            }
        }
        self.filtered_images = images.clone();
        self.all_images = images;
        self.last_updated = Some(Utc::now());
    }

    /// Recompute `filtered_images` from `all_images` and the selection.
    pub fn apply_filters(&mut self) {
        self.filtered_images = filter_images(&self.all_images, &self.selection);
    }

    pub fn get_by_id(&self, id: &str) -> Option<&ImageRecord> {
        self.all_images.iter().find(|image| image.id == id)
    }

    pub fn all_images(&self) -> &[ImageRecord] {
        &self.all_images
    }

    pub fn filtered_images(&self) -> &[ImageRecord] {
        &self.filtered_images
    }

    /// Records carrying `category`, in load order.
    pub fn images_in_category(&self, category: &str) -> Vec<&ImageRecord> {
        self.category_index
            .get(category)
            .map(|idxs| idxs.iter().map(|&i| &self.all_images[i]).collect())
            .unwrap_or_default()
    }

    pub fn category_count(&self, category: &str) -> usize {
        self.category_index.get(category).map_or(0, Vec::len)
    }

    /// Category names present in the loaded records, sorted.
    pub fn category_names(&self) -> Vec<&str> {
        self.category_index.keys().map(String::as_str).collect()
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn set_search(&mut self, query: &str) {
        self.selection.search = query.to_string();
    }

    pub fn set_category(&mut self, category: &str) {
        self.selection.category = category.to_string();
    }

    pub fn set_license(&mut self, license: &str) {
        self.selection.license = license.to_string();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.selection.view_mode = mode;
    }

    /// Clear search, category and license. The view mode is kept.
    pub fn reset_selection(&mut self) {
        let view_mode = self.selection.view_mode;
        self.selection = FilterSelection {
            view_mode,
            ..FilterSelection::default()
        };
    }
}

/// Narrow `images` by search, then category, then license.
pub fn filter_images(images: &[ImageRecord], selection: &FilterSelection) -> Vec<ImageRecord> {
    let searching = !selection.search.trim().is_empty();
    let query = selection.search.to_lowercase();
    images
        .iter()
        .filter(|image| !searching || matches_search(image, &query))
        .filter(|image| selection.category == ALL || image.has_category(&selection.category))
        .filter(|image| selection.license == ALL || image.license == selection.license)
        .cloned()
        .collect()
}

/// `query` must already be lowercase.
fn matches_search(image: &ImageRecord, query: &str) -> bool {
    image.title.to_lowercase().contains(query)
        || image.description.to_lowercase().contains(query)
        || image.tags.iter().any(|t| t.to_lowercase().contains(query))
}
