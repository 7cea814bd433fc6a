//! Gallery UI: interaction state and HTML rendering.
//!
//! [`GalleryUI`] owns one [`GalleryState`] and everything a visitor can
//! change about what is on screen: the search draft, the page, the open
//! lightbox and the open details modal. Gestures are plain method calls;
//! [`GalleryUI::render`] projects the current state to markup.
//!
//! ```text
//! begin_load → finish_load(Ok)  → Ready  → set_category / submit_search / next_page / …
//!            → finish_load(Err) → Failed (reload message, nothing panics)
//! ```
//!
//! ## Links
//!
//! The same markup serves two hosts:
//!
//! - [`Links::Interactive`] renders `data-action` hooks for a script that
//!   calls back into the gallery.
//! - [`Links::Static`] renders plain hrefs into a site written by
//!   [`generate`](crate::generate), where every UI state the visitor can
//!   reach has its own page. Filters become [`Section`]s: one directory per
//!   category, license and color or brand keyword. The view mode is switched
//!   in the browser by `static/nav.js`.
//!
//! ## Rendered structure
//!
//! ```text
//! div.maka-gallery-container
//! ├── header.maka-gallery-header      title, stats
//! ├── div.maka-gallery-filters        search, category, license, view, reset
//! │   or nav.maka-gallery-filters     section links and view toggles (static)
//! ├── div.maka-gallery-grid.{mode}-view   cards for the current page
//! │   or div.no-results               exactly one, when nothing matches
//! ├── div.maka-gallery-pagination     only with more than one page
//! ├── div.gallery-fullscreen          open lightbox
//! └── div.gallery-modal               open details
//! ```

use crate::catalog::CatalogSource;
use crate::config::{GalleryConfig, SiteConfig};
use crate::load::{GalleryLoader, LoadError, LoadOutput};
use crate::metadata::{BRAND_KEYWORDS, COLOR_KEYWORDS, sanitize_slug};
use crate::state::GalleryState;
use crate::types::{ALL, ImageRecord, ViewMode};
use maud::{Markup, html};
use std::collections::HashSet;

/// Shown in place of an image that is missing or fails to load.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml,%3Csvg%20xmlns=%22http://www.w3.org/2000/svg%22%20width=%22300%22%20height=%22300%22%3E%3Crect%20width=%22100%25%22%20height=%22100%25%22%20fill=%22%23eeeeee%22/%3E%3Ctext%20x=%2250%25%22%20y=%2250%25%22%20text-anchor=%22middle%22%20fill=%22%23999999%22%3EImage%20unavailable%3C/text%3E%3C/svg%3E";

const NO_RESULTS: &str = "No images found matching your criteria.";
const LOAD_FAILED: &str = "Failed to load gallery. Please reload the page.";

fn placeholder_onerror() -> String {
    format!("this.onerror=null;this.src='{PLACEHOLDER_IMAGE}'")
}

/// A filtered view with its own directory in a generated site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    All,
    Category(String),
    License(String),
    /// A committed search for a color or brand keyword.
    Search(String),
}

impl Section {
    /// Directory relative to the site root.
    ///
    /// ```text
    /// All                  → ""
    /// Category("T-Shirts") → "category/t-shirts/"
    /// License("CC-BY-4.0") → "license/cc-by-4-0/"
    /// Search("black")      → "search/black/"
    /// ```
    pub fn path(&self) -> String {
        match self {
            Self::All => String::new(),
            Self::Category(name) => format!("category/{}/", sanitize_slug(name)),
            Self::License(name) => format!("license/{}/", sanitize_slug(name)),
            Self::Search(query) => format!("search/{}/", sanitize_slug(query)),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::All => "All".to_string(),
            Self::Category(name) | Self::License(name) => name.clone(),
            Self::Search(query) => format!("\"{query}\""),
        }
    }
}

/// Absolute paths and URLs are served from elsewhere.
pub fn is_external(path: &str) -> bool {
    path.starts_with('/') || path.contains("://") || path.starts_with("data:")
}

/// Where the gallery is loading from, and whether that worked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Failed(String),
}

/// How interactive controls are wired in rendered markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Links {
    Interactive,
    /// Hrefs into a generated site. `root` leads from the rendered page to
    /// the site root (`""`, `"../"`, …); `section` is the current category
    /// directory relative to the root.
    Static { root: String, section: String },
}

impl Links {
    pub fn site(root: impl Into<String>, section: impl Into<String>) -> Self {
        Self::Static {
            root: root.into(),
            section: section.into(),
        }
    }

    fn is_static(&self) -> bool {
        matches!(self, Self::Static { .. })
    }

    fn page_href(&self, page: usize) -> String {
        match self {
            Self::Interactive => "#".to_string(),
            Self::Static { root, section } if page <= 1 => format!("{root}{section}index.html"),
            Self::Static { root, section } => format!("{root}{section}page-{page}.html"),
        }
    }

    fn view_href(&self, index: usize) -> String {
        match self {
            Self::Interactive => "#".to_string(),
            Self::Static { root, section } => format!("{root}{section}view/{}.html", index + 1),
        }
    }

    fn details_href(&self, id: &str) -> String {
        match self {
            Self::Interactive => "#".to_string(),
            Self::Static { root, .. } => format!("{root}details/{id}.html"),
        }
    }

    fn section_href(&self, section: &Section) -> String {
        match self {
            Self::Interactive => "#".to_string(),
            Self::Static { root, .. } => format!("{root}{}index.html", section.path()),
        }
    }

    fn asset(&self, path: &str) -> String {
        match self {
            Self::Static { root, .. } if !is_external(path) => format!("{root}{path}"),
            _ => path.to_string(),
        }
    }
}

/// Keys the gallery responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Enter,
    Other,
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` name.
    pub fn parse(name: &str) -> Self {
        match name {
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            _ => Self::Other,
        }
    }
}

pub struct GalleryUI {
    config: GalleryConfig,
    licenses: Vec<String>,
    state: GalleryState,
    phase: Phase,
    links: Links,
    search_draft: String,
    /// 1-based.
    page: usize,
    /// Index into the filtered images.
    lightbox: Option<usize>,
    /// Id of the record shown in the details modal.
    details: Option<String>,
    missing_assets: HashSet<String>,
}

impl GalleryUI {
    pub fn new(config: &SiteConfig, links: Links) -> Self {
        Self {
            config: config.gallery.clone(),
            licenses: config.moderation.licenses.clone(),
            state: GalleryState::new(),
            phase: Phase::Loading,
            links,
            search_draft: String::new(),
            page: 1,
            lightbox: None,
            details: None,
            missing_assets: HashSet::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn set_links(&mut self, links: Links) {
        self.links = links;
    }

    /// Image paths known not to exist. They render as the placeholder.
    pub fn set_missing_assets(&mut self, missing: HashSet<String>) {
        self.missing_assets = missing;
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    pub fn begin_load(&mut self) {
        self.phase = Phase::Loading;
    }

    /// Publish a finished load. A new batch starts unfiltered on page 1.
    pub fn finish_load(&mut self, result: Result<LoadOutput, LoadError>) {
        match result {
            Ok(output) => {
                self.state.set_images(output.images);
                self.state.reset_selection();
                self.search_draft.clear();
                self.page = 1;
                self.lightbox = None;
                self.details = None;
                self.phase = Phase::Ready;
            }
            Err(e) => self.fail_load(&e),
        }
    }

    /// Show the reload message. Loaded records, if any, are kept.
    pub fn fail_load(&mut self, error: &LoadError) {
        tracing::error!(error = %error, "gallery failed to load");
        self.phase = Phase::Failed(error.to_string());
    }

    /// Run a load through `loader` and publish the result.
    pub async fn load(&mut self, loader: &GalleryLoader, source: &dyn CatalogSource) {
        self.begin_load();
        let result = loader.load(source).await;
        self.finish_load(result);
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Store search text without filtering.
    pub fn set_search_draft(&mut self, text: &str) {
        self.search_draft = text.to_string();
    }

    pub fn search_draft(&self) -> &str {
        &self.search_draft
    }

    pub fn submit_search(&mut self) {
        let draft = self.search_draft.clone();
        self.state.set_search(&draft);
        self.commit_filters();
    }

    /// Enter commits the draft. Other keys are ignored.
    pub fn handle_search_key(&mut self, key: Key) {
        if key == Key::Enter {
            self.submit_search();
        }
    }

    pub fn set_category(&mut self, category: &str) {
        self.state.set_category(category);
        self.commit_filters();
    }

    pub fn set_license(&mut self, license: &str) {
        self.state.set_license(license);
        self.commit_filters();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.state.set_view_mode(mode);
        self.commit_filters();
    }

    /// Clear search, category and license and show the full set.
    pub fn reset_filters(&mut self) {
        self.search_draft.clear();
        self.state.reset_selection();
        self.commit_filters();
    }

    /// Show exactly what `section` selects, starting on page 1. The view
    /// mode is kept.
    pub fn show_section(&mut self, section: &Section) {
        self.reset_filters();
        match section {
            Section::All => {}
            Section::Category(name) => self.set_category(name),
            Section::License(name) => self.set_license(name),
            Section::Search(query) => {
                self.set_search_draft(query);
                self.handle_search_key(Key::Enter);
            }
        }
    }

    /// The section the current selection corresponds to. Search wins over
    /// license, license over category.
    pub fn current_section(&self) -> Section {
        let selection = self.state.selection();
        if !selection.search.trim().is_empty() {
            Section::Search(selection.search.clone())
        } else if selection.license != ALL {
            Section::License(selection.license.clone())
        } else if selection.category != ALL {
            Section::Category(selection.category.clone())
        } else {
            Section::All
        }
    }

    /// Every section with at least one image: all, present categories,
    /// present licenses, then color and brand keywords found in tags.
    pub fn sections(&self) -> Vec<Section> {
        let mut sections = vec![Section::All];
        sections.extend(
            self.state
                .category_names()
                .into_iter()
                .map(|c| Section::Category(c.to_string())),
        );
        sections.extend(
            self.present_licenses()
                .into_iter()
                .map(|l| Section::License(l.to_string())),
        );
        sections.extend(
            self.present_keywords()
                .into_iter()
                .map(|k| Section::Search(k.to_string())),
        );
        sections
    }

    /// Licenses used by the loaded records: configured ones first, then
    /// others in load order.
    fn present_licenses(&self) -> Vec<&str> {
        let images = self.state.all_images();
        let mut licenses: Vec<&str> = self
            .licenses
            .iter()
            .map(String::as_str)
            .filter(|l| images.iter().any(|i| i.license == *l))
            .collect();
        for image in images {
            if !licenses.contains(&image.license.as_str()) {
                licenses.push(&image.license);
            }
        }
        licenses
    }

    fn license_count(&self, license: &str) -> usize {
        self.state
            .all_images()
            .iter()
            .filter(|i| i.license == license)
            .count()
    }

    /// Color then brand keywords carried as a tag by some record.
    fn present_keywords(&self) -> Vec<&'static str> {
        let images = self.state.all_images();
        COLOR_KEYWORDS
            .iter()
            .chain(BRAND_KEYWORDS)
            .copied()
            .filter(|kw| {
                images
                    .iter()
                    .any(|i| i.tags.iter().any(|t| t.eq_ignore_ascii_case(kw)))
            })
            .collect()
    }

    fn commit_filters(&mut self) {
        self.state.apply_filters();
        self.page = 1;
        self.lightbox = None;
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    fn page_size(&self) -> usize {
        self.config.page_size.max(1)
    }

    pub fn total_pages(&self) -> usize {
        self.state.filtered_images().len().div_ceil(self.page_size())
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Move to `page`, clamped into `1..=total_pages`.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages().max(1));
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }

    /// Page containing the filtered image at `index`.
    pub fn page_of(&self, index: usize) -> usize {
        index / self.page_size() + 1
    }

    /// Filtered images on the current page.
    pub fn page_slice(&self) -> &[ImageRecord] {
        let images = self.state.filtered_images();
        let start = ((self.page - 1) * self.page_size()).min(images.len());
        let end = (start + self.page_size()).min(images.len());
        &images[start..end]
    }

    // ------------------------------------------------------------------
    // Lightbox and details
    // ------------------------------------------------------------------

    /// Open the lightbox at `index` into the filtered images. Returns false
    /// and changes nothing when `index` is out of range.
    pub fn open_lightbox(&mut self, index: usize) -> bool {
        if index < self.state.filtered_images().len() {
            self.lightbox = Some(index);
            true
        } else {
            false
        }
    }

    pub fn lightbox_index(&self) -> Option<usize> {
        self.lightbox
    }

    /// Step forward. A no-op on the last image.
    pub fn lightbox_next(&mut self) {
        if let Some(i) = self.lightbox
            && i + 1 < self.state.filtered_images().len()
        {
            self.lightbox = Some(i + 1);
        }
    }

    /// Step back. A no-op on the first image.
    pub fn lightbox_prev(&mut self) {
        if let Some(i) = self.lightbox
            && i > 0
        {
            self.lightbox = Some(i - 1);
        }
    }

    pub fn close_lightbox(&mut self) {
        self.lightbox = None;
    }

    /// Arrows navigate an open lightbox; Escape closes the lightbox, or the
    /// details modal when no lightbox is open.
    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::ArrowLeft if self.lightbox.is_some() => self.lightbox_prev(),
            Key::ArrowRight if self.lightbox.is_some() => self.lightbox_next(),
            Key::Escape if self.lightbox.is_some() => self.close_lightbox(),
            Key::Escape => self.close_details(),
            _ => {}
        }
    }

    /// Show the details modal for `id`. Unknown ids leave it closed.
    pub fn open_details(&mut self, id: &str) -> bool {
        if self.state.get_by_id(id).is_some() {
            self.details = Some(id.to_string());
            true
        } else {
            tracing::debug!(id, "details requested for unknown image");
            false
        }
    }

    pub fn details_id(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn close_details(&mut self) {
        self.details = None;
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn asset_src(&self, path: &str) -> String {
        if self.missing_assets.contains(path) {
            PLACEHOLDER_IMAGE.to_string()
        } else {
            self.links.asset(path)
        }
    }

    /// The whole gallery for the current state.
    pub fn render(&self) -> Markup {
        html! {
            div.maka-gallery-container {
                (self.render_header())
                @match &self.phase {
                    Phase::Loading => {
                        div.loading-indicator {
                            div.spinner {}
                            p { "Loading gallery..." }
                        }
                    }
                    Phase::Failed(_) => {
                        (render_load_error())
                    }
                    Phase::Ready => {
                        (self.render_filters())
                        (self.render_grid())
                        (self.render_pagination())
                        @if let Some(lightbox) = self.render_lightbox() {
                            (lightbox)
                        }
                        @if let Some(record) = self.details.as_deref().and_then(|id| self.state.get_by_id(id)) {
                            (self.render_details(record))
                        }
                    }
                }
            }
        }
    }

    fn render_header(&self) -> Markup {
        let updated = self
            .state
            .last_updated()
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "Never".to_string());
        html! {
            header.maka-gallery-header {
                h2 { (self.config.title) }
                p.gallery-subtitle { (self.config.subtitle) }
                div.gallery-stats {
                    span.stat { strong #total-images { (self.state.all_images().len()) } " images" }
                    span.stat { strong #total-categories { (self.state.category_names().len()) } " categories" }
                    span.stat { "Updated " strong #last-updated { (updated) } }
                }
            }
        }
    }

    /// Category options: configured ones first, then any other category
    /// present in the loaded records.
    fn category_options(&self) -> Vec<&str> {
        let mut options: Vec<&str> = self.config.categories.iter().map(String::as_str).collect();
        for name in self.state.category_names() {
            if !options.contains(&name) {
                options.push(name);
            }
        }
        options
    }

    fn render_filters(&self) -> Markup {
        let selection = self.state.selection();
        if self.links.is_static() {
            return self.render_section_nav();
        }
        html! {
            div.maka-gallery-filters {
                div.search-box {
                    input #maka-search type="search" placeholder="Search images..."
                        value=(self.search_draft) data-action="search-draft";
                    button.search-btn type="button" data-action="search" { "Search" }
                }
                select #maka-category data-action="category" {
                    option value=(ALL) selected[selection.category == ALL] { "All Categories" }
                    @for category in self.category_options() {
                        option value=(category) selected[selection.category == category] { (category) }
                    }
                }
                select #maka-license data-action="license" {
                    option value=(ALL) selected[selection.license == ALL] { "All Licenses" }
                    @for license in &self.licenses {
                        option value=(license) selected[&selection.license == license] { (license) }
                    }
                }
                select #maka-view data-action="view-mode" {
                    @for mode in ViewMode::ALL {
                        option value=(mode.as_str()) selected[selection.view_mode == mode] { (mode.label()) }
                    }
                }
                button.reset-btn type="button" data-action="reset" { "Reset" }
            }
        }
    }

    /// Static filters: links to every section, and view toggles.
    fn render_section_nav(&self) -> Markup {
        let current = self.current_section();
        let categories = self.state.category_names();
        let licenses = self.present_licenses();
        let keywords = self.present_keywords();
        let view_mode = self.state.selection().view_mode;
        html! {
            nav.maka-gallery-filters.section-nav {
                div.filter-row {
                    span.filter-label { "Categories" }
                    a.section-link.current[current == Section::All] href=(self.links.section_href(&Section::All)) {
                        "All " span.count { (self.state.all_images().len()) }
                    }
                    @for category in categories {
                        @let section = Section::Category(category.to_string());
                        a.section-link.current[current == section] href=(self.links.section_href(&section)) {
                            (category) " " span.count { (self.state.category_count(category)) }
                        }
                    }
                }
                @if !licenses.is_empty() {
                    div.filter-row {
                        span.filter-label { "Licenses" }
                        @for license in licenses {
                            @let section = Section::License(license.to_string());
                            a.section-link.current[current == section] href=(self.links.section_href(&section)) {
                                (license) " " span.count { (self.license_count(license)) }
                            }
                        }
                    }
                }
                @if !keywords.is_empty() {
                    div.filter-row {
                        span.filter-label { "Popular" }
                        @for keyword in keywords {
                            @let section = Section::Search(keyword.to_string());
                            a.section-link.current[current == section] href=(self.links.section_href(&section)) {
                                (keyword)
                            }
                        }
                    }
                }
                div.view-toggle {
                    @for mode in ViewMode::ALL {
                        button.view-btn.current[view_mode == mode] type="button" data-view=(mode.as_str()) {
                            (mode.label())
                        }
                    }
                }
            }
        }
    }

    fn render_grid(&self) -> Markup {
        if self.state.filtered_images().is_empty() {
            return html! { div.no-results { (NO_RESULTS) } };
        }
        let offset = (self.page - 1) * self.page_size();
        let mode = self.state.selection().view_mode.as_str();
        html! {
            div class={ "maka-gallery-grid " (mode) "-view" } {
                @for (i, record) in self.page_slice().iter().enumerate() {
                    (self.render_card(record, offset + i))
                }
            }
        }
    }

    /// One card. `index` is the record's position in the filtered images.
    pub fn render_card(&self, record: &ImageRecord, index: usize) -> Markup {
        let flagged = record.is_flagged();
        let description =
            truncate_description(&record.safe_description, self.config.description_limit);
        html! {
            div.maka-gallery-item.moderation-flagged[flagged] data-id=(record.id) data-index=(index) {
                div.gallery-item-inner {
                    div.gallery-image-container {
                        @if self.links.is_static() {
                            a.gallery-image-link href=(self.links.view_href(index)) {
                                (self.card_image(record))
                            }
                        } @else {
                            div.gallery-image-link data-action="lightbox" data-index=(index) {
                                (self.card_image(record))
                            }
                        }
                        span.item-badge { (record.badge) }
                        @if flagged {
                            div.moderation-badge title="Content flagged for review" { "⚠" }
                        }
                        div.image-overlay {
                            @if self.links.is_static() {
                                a.view-details-btn href=(self.links.details_href(&record.id)) { "View Details" }
                            } @else {
                                button.view-details-btn type="button" data-action="details" data-id=(record.id) { "View Details" }
                            }
                        }
                    }
                    div.gallery-item-info {
                        h3.gallery-item-title { (record.title) }
                        div.gallery-item-badges {
                            @for category in record.categories.iter().take(self.config.card_categories) {
                                span.category-badge { (category) }
                            }
                        }
                        p.gallery-item-description { (description) }
                        div.gallery-item-meta {
                            span.license-info { (record.license) }
                            span.source-info { (record.source) }
                        }
                    }
                }
            }
        }
    }

    fn card_image(&self, record: &ImageRecord) -> Markup {
        html! {
            img.gallery-image src=(self.asset_src(&record.thumbnail_path)) alt=(record.title)
                loading="lazy" onerror=(placeholder_onerror());
        }
    }

    fn render_pagination(&self) -> Markup {
        let total = self.total_pages();
        if total <= 1 {
            return html! {};
        }
        let page = self.page;
        html! {
            div.maka-gallery-pagination {
                div.pagination-controls {
                    @if page > 1 {
                        @if self.links.is_static() {
                            a.pagination-prev href=(self.links.page_href(page - 1)) { "Previous" }
                        } @else {
                            button.pagination-prev type="button" data-action="prev-page" { "Previous" }
                        }
                    }
                    span.pagination-info { "Page " (page) " of " (total) }
                    @if page < total {
                        @if self.links.is_static() {
                            a.pagination-next href=(self.links.page_href(page + 1)) { "Next" }
                        } @else {
                            button.pagination-next type="button" data-action="next-page" { "Next" }
                        }
                    }
                }
            }
        }
    }

    /// The open lightbox, if any.
    pub fn render_lightbox(&self) -> Option<Markup> {
        let index = self.lightbox?;
        let images = self.state.filtered_images();
        let record = images.get(index)?;
        let count = images.len();
        let has_prev = index > 0;
        let has_next = index + 1 < count;

        let markup = if self.links.is_static() {
            let prev = has_prev.then(|| self.links.view_href(index - 1));
            let next = has_next.then(|| self.links.view_href(index + 1));
            let close = self.links.page_href(self.page);
            html! {
                div.gallery-fullscreen data-index=(index) data-prev=[prev.as_ref()] data-next=[next.as_ref()] data-close=(close) {
                    div.fullscreen-content {
                        a.fullscreen-close href=(close) { "×" }
                        @if let Some(href) = &prev {
                            a.fullscreen-prev href=(href) { "‹" }
                        }
                        @if let Some(href) = &next {
                            a.fullscreen-next href=(href) { "›" }
                        }
                        (self.lightbox_body(record, index, count))
                    }
                }
            }
        } else {
            html! {
                div.gallery-fullscreen data-index=(index) {
                    div.fullscreen-content {
                        button.fullscreen-close type="button" data-action="close-lightbox" { "×" }
                        button.fullscreen-prev type="button" data-action="lightbox-prev" disabled[!has_prev] { "‹" }
                        button.fullscreen-next type="button" data-action="lightbox-next" disabled[!has_next] { "›" }
                        (self.lightbox_body(record, index, count))
                    }
                }
            }
        };
        Some(markup)
    }

    fn lightbox_body(&self, record: &ImageRecord, index: usize, count: usize) -> Markup {
        html! {
            div.fullscreen-image-container {
                img.fullscreen-image src=(self.asset_src(&record.image_path)) alt=(record.title)
                    onerror=(placeholder_onerror());
            }
            div.fullscreen-info {
                h3 { (record.title) }
                p.fullscreen-description { (record.safe_description) }
                div.fullscreen-meta {
                    span.fullscreen-position { (index + 1) " of " (count) }
                    span { (record.license) }
                }
            }
        }
    }

    /// Details modal with the untruncated description and, when flagged,
    /// every moderation issue.
    pub fn render_details(&self, record: &ImageRecord) -> Markup {
        let flagged = record.is_flagged();
        let close = self
            .links
            .is_static()
            .then(|| self.links.page_href(self.page));
        let download_name = format!(
            "{}.jpg",
            record.title.split_whitespace().collect::<Vec<_>>().join("_")
        );
        let share = self.share_href(record);
        html! {
            div.gallery-modal role="dialog" data-id=(record.id) data-close=[close.as_ref()] {
                div.modal-content {
                    @if let Some(href) = &close {
                        a.modal-close href=(href) { "×" }
                    } @else {
                        button.modal-close type="button" data-action="close-details" { "×" }
                    }
                    div.modal-header {
                        h3 { (record.title) }
                        @if flagged {
                            div.moderation-warning { "⚠ This content has been flagged for review" }
                        }
                    }
                    div.modal-body {
                        div.modal-image-container {
                            img.modal-image src=(self.asset_src(&record.image_path)) alt=(record.title)
                                onerror=(placeholder_onerror());
                        }
                        div.modal-info {
                            p.modal-description { strong { "Description:" } " " (record.safe_description) }
                            p { strong { "Categories:" } " " (record.categories.join(", ")) }
                            p { strong { "Tags:" } " " (record.tags.join(", ")) }
                            p { strong { "License:" } " " (record.license) }
                            p { strong { "Source:" } " " (record.source) }
                            p { strong { "Date Added:" } " " (record.date_added.format("%Y-%m-%d").to_string()) }
                            @if flagged {
                                div.moderation-details {
                                    strong { "Moderation Issues:" }
                                    ul {
                                        @for issue in &record.moderation_issues {
                                            li { (issue) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    div.modal-footer {
                        a.download-btn href=(self.asset_src(&record.image_path)) download=(download_name) { "Download" }
                        a.share-btn href=(share) { "Share" }
                    }
                }
            }
        }
    }

    /// `mailto:` link carrying the title and safe description, plus the
    /// details page URL when the site's public URL is configured.
    fn share_href(&self, record: &ImageRecord) -> String {
        let mut body = record.safe_description.clone();
        let base = self.config.base_url.trim_end_matches('/');
        if !base.is_empty() {
            body.push_str(&format!("\n\n{base}/details/{}.html", record.id));
        }
        format!(
            "mailto:?subject={}&body={}",
            urlencoding::encode(&record.title),
            urlencoding::encode(&body)
        )
    }
}

fn render_load_error() -> Markup {
    html! {
        div.gallery-error {
            p { (LOAD_FAILED) }
            button.retry-btn type="button" data-action="reload" onclick="location.reload()" { "Reload" }
        }
    }
}

/// Hard cut at `limit` characters, plus `...` when anything was cut.
pub fn truncate_description(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
