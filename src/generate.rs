//! HTML site generation.
//!
//! Writes the gallery as a static site: every state a visitor can reach in
//! the [`GalleryUI`] (a [`Section`], a page, an open lightbox, an open
//! details modal) is rendered once and saved under its own URL.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # All images, page 1
//! ├── page-2.html                # Later pages
//! ├── view/
//! │   ├── 1.html                 # Lightbox over the page holding image 1
//! │   └── ...
//! ├── category/
//! │   └── kids/                  # Same layout per present category
//! │       ├── index.html
//! │       └── view/1.html
//! ├── license/cc-by-4-0/         # ... per license in use
//! ├── search/black/              # ... per color or brand keyword in tags
//! ├── details/
//! │   └── img-0.html             # Details modal per record
//! ├── gallery.json               # Enriched records
//! └── Assets/...                 # Copied images (when an asset root is given)
//! ```
//!
//! Lightbox pages link to their neighbours; the links are left out at the
//! first and last image rather than wrapping around.
//!
//! ## Assets
//!
//! Without an asset root, image paths are written as-is and broken images
//! fall back to the placeholder in the browser. With one, the root is
//! indexed up front: present files are copied next to the pages and
//! missing ones render the placeholder directly.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors injected from config)
//! - `static/nav.js`: View mode toggles, and keyboard navigation for
//!   lightbox and details pages
//!
//! ## Load failures
//!
//! [`write_load_failure`] writes a lone `index.html` showing the reload
//! message, so a failed build still leaves a page behind.

use crate::cache::CacheStats;
use crate::config::{self, SiteConfig};
use crate::load::{LoadError, LoadOutput};
use crate::types::ImageRecord;
use crate::ui::{GalleryUI, Links, Section, is_external};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Asset scan error: {0}")]
    Walk(#[from] walkdir::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/nav.js");

/// Pages written for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    pub section: Section,
    /// Directory relative to the output root.
    pub path: String,
    pub images: usize,
    pub pages: usize,
}

/// What [`generate`] wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub sections: Vec<SectionReport>,
    pub detail_pages: usize,
    pub assets_copied: usize,
    /// Image paths not found under the asset root, sorted.
    pub missing_assets: Vec<String>,
}

impl GenerateReport {
    /// Grid, lightbox and details pages.
    pub fn total_pages(&self) -> usize {
        self.sections
            .iter()
            .map(|s| s.pages + s.images)
            .sum::<usize>()
            + self.detail_pages
    }
}

/// Files under an asset root, as `/`-separated paths relative to it.
#[derive(Debug, Clone)]
pub struct AssetIndex {
    root: PathBuf,
    files: HashSet<String>,
}

impl AssetIndex {
    pub fn scan(root: &Path) -> Result<Self, GenerateError> {
        let mut files = HashSet::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(root) {
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                files.insert(key);
            }
        }
        tracing::debug!(root = %root.display(), files = files.len(), "indexed asset root");
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn source(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

/// Write the site for `images` into `output_dir`.
pub fn generate(
    images: &[ImageRecord],
    config: &SiteConfig,
    output_dir: &Path,
    asset_root: Option<&Path>,
) -> Result<GenerateReport, GenerateError> {
    // Generate CSS with colors from config
    let color_css = config::generate_color_css(&config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);

    fs::create_dir_all(output_dir)?;
    let mut report = GenerateReport::default();

    let mut ui = GalleryUI::new(config, Links::site("", ""));
    if let Some(root) = asset_root {
        let index = AssetIndex::scan(root)?;
        let (copied, missing) = copy_assets(images, &index, output_dir)?;
        for path in &missing {
            tracing::warn!(path = %path, "image not found under asset root, using placeholder");
        }
        report.assets_copied = copied;
        report.missing_assets = missing.iter().cloned().collect();
        report.missing_assets.sort();
        ui.set_missing_assets(missing);
    }

    ui.finish_load(Ok(LoadOutput {
        images: images.to_vec(),
        cache_stats: CacheStats::default(),
    }));
    ui.set_view_mode(config.gallery.view_mode);

    for section in ui.sections() {
        let written = write_section(&mut ui, &section, &css, &config.gallery.title, output_dir)?;
        tracing::info!(
            section = %written.section.label(),
            images = written.images,
            pages = written.pages,
            "generated section"
        );
        report.sections.push(written);
    }

    ui.show_section(&Section::All);
    ui.set_links(Links::site("../", ""));
    let details_dir = output_dir.join("details");
    fs::create_dir_all(&details_dir)?;
    for record in images {
        if !ui.open_details(&record.id) {
            continue;
        }
        let title = format!("{} - {}", record.title, config.gallery.title);
        let page = base_document(&title, &css, Some("details-view"), ui.render());
        fs::write(
            details_dir.join(format!("{}.html", record.id)),
            page.into_string(),
        )?;
        ui.close_details();
        report.detail_pages += 1;
    }

    fs::write(
        output_dir.join("gallery.json"),
        serde_json::to_string_pretty(images)?,
    )?;

    tracing::info!(
        output = %output_dir.display(),
        pages = report.total_pages(),
        "site generated"
    );
    Ok(report)
}

/// Grid pages and lightbox pages for one section.
fn write_section(
    ui: &mut GalleryUI,
    section: &Section,
    css: &str,
    site_title: &str,
    output_dir: &Path,
) -> Result<SectionReport, GenerateError> {
    ui.show_section(section);
    let path = section.path();
    let root = "../".repeat(path.matches('/').count());
    let dir = output_dir.join(&path);
    fs::create_dir_all(&dir)?;

    let title = match section {
        Section::All => site_title.to_string(),
        _ => format!("{} - {site_title}", section.label()),
    };

    let pages = ui.total_pages().max(1);
    ui.set_links(Links::site(root.as_str(), path.as_str()));
    for page in 1..=pages {
        ui.go_to_page(page);
        let filename = if page == 1 {
            "index.html".to_string()
        } else {
            format!("page-{page}.html")
        };
        let doc = base_document(&title, css, None, ui.render());
        fs::write(dir.join(filename), doc.into_string())?;
    }

    let count = ui.state().filtered_images().len();
    if count > 0 {
        let view_dir = dir.join("view");
        fs::create_dir_all(&view_dir)?;
        ui.set_links(Links::site(format!("../{root}"), path.as_str()));
        for index in 0..count {
            ui.go_to_page(ui.page_of(index));
            ui.open_lightbox(index);
            let page_title = format!("{title} - {} of {count}", index + 1);
            let doc = base_document(&page_title, css, Some("lightbox-view"), ui.render());
            fs::write(
                view_dir.join(format!("{}.html", index + 1)),
                doc.into_string(),
            )?;
        }
        ui.close_lightbox();
    }

    Ok(SectionReport {
        section: section.clone(),
        path,
        images: count,
        pages,
    })
}

/// Write an `index.html` showing the reload message for a failed load.
pub fn write_load_failure(
    error: &LoadError,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<(), GenerateError> {
    let css = format!(
        "{}\n\n{}",
        config::generate_color_css(&config.colors),
        CSS_STATIC
    );
    let mut ui = GalleryUI::new(config, Links::site("", ""));
    ui.fail_load(error);

    fs::create_dir_all(output_dir)?;
    let doc = base_document(&config.gallery.title, &css, None, ui.render());
    fs::write(output_dir.join("index.html"), doc.into_string())?;
    Ok(())
}

/// Copy every indexed image the records use. Returns the copy count and
/// the paths that were not found.
fn copy_assets(
    images: &[ImageRecord],
    index: &AssetIndex,
    output_dir: &Path,
) -> Result<(usize, HashSet<String>), GenerateError> {
    let mut wanted: Vec<&str> = images
        .iter()
        .flat_map(|r| [r.image_path.as_str(), r.thumbnail_path.as_str()])
        .filter(|p| !is_external(p))
        .collect();
    wanted.sort_unstable();
    wanted.dedup();

    let mut copied = 0;
    let mut missing = HashSet::new();
    for path in wanted {
        if !index.contains(path) {
            missing.insert(path.to_string());
            continue;
        }
        let dst = output_dir.join(path);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(index.source(path), &dst)?;
        copied += 1;
    }
    Ok((copied, missing))
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn sample() -> Vec<ImageRecord> {
        let mut tee = flagged("img-2", "t-shirt", &["Contains banned keyword: stolen"]);
        tee.categories = vec!["T-Shirts".into()];
        vec![
            record_with("img-0", "hoodie", &["Kids", "Hoodies"], &["black"]),
            record_with("img-1", "jacket", &["Kids", "Jackets"], &["red"]),
            tee,
        ]
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    // =========================================================================
    // Components
    // =========================================================================

    #[test]
    fn base_document_includes_doctype() {
        let doc = base_document("Test", "body {}", None, html! { p { "hi" } }).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Test</title>"));
        assert!(doc.contains("<style>body {}</style>"));
    }

    #[test]
    fn base_document_includes_script_and_class() {
        let doc = base_document("T", "", Some("lightbox-view"), html! {}).into_string();
        assert!(doc.contains(r#"<body class="lightbox-view">"#));
        assert!(doc.contains("<script>"));
    }

    #[test]
    fn html_escape_in_maud() {
        let mut record = record("img-0", "<script>alert(1)</script>");
        record.safe_description = "a & b".into();
        let tmp = TempDir::new().unwrap();
        generate(&[record], &SiteConfig::default(), tmp.path(), None).unwrap();
        let html = read(&tmp.path().join("index.html"));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    // =========================================================================
    // Site layout
    // =========================================================================

    #[test]
    fn writes_section_per_present_category() {
        let tmp = TempDir::new().unwrap();
        let report = generate(&sample(), &SiteConfig::default(), tmp.path(), None).unwrap();

        let paths: Vec<&str> = report.sections.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "",
                "category/hoodies/",
                "category/jackets/",
                "category/kids/",
                "category/t-shirts/",
                "license/cc-by-4-0/",
                "search/black/",
                "search/red/",
            ]
        );
        assert!(tmp.path().join("index.html").exists());
        assert!(tmp.path().join("category/kids/index.html").exists());
        assert!(tmp.path().join("category/t-shirts/view/1.html").exists());
        assert!(!tmp.path().join("category/accessories").exists());

        let kids = read(&tmp.path().join("category/kids/index.html"));
        assert_eq!(count_occurrences(&kids, r#"class="maka-gallery-item"#), 2);
        assert!(kids.contains(r#"href="../../index.html""#));
    }

    #[test]
    fn writes_later_pages() {
        let tmp = TempDir::new().unwrap();
        let report = generate(&numbered(25), &SiteConfig::default(), tmp.path(), None).unwrap();
        assert_eq!(report.sections[0].pages, 3);
        assert!(tmp.path().join("page-2.html").exists());
        assert!(tmp.path().join("page-3.html").exists());
        assert!(!tmp.path().join("page-4.html").exists());

        let last = read(&tmp.path().join("page-3.html"));
        assert!(last.contains("Page 3 of 3"));
        assert!(last.contains(r#"href="page-2.html""#));
        assert_eq!(count_occurrences(&last, r#"class="maka-gallery-item"#), 1);
    }

    #[test]
    fn lightbox_pages_link_neighbours_without_wrapping() {
        let tmp = TempDir::new().unwrap();
        generate(&numbered(13), &SiteConfig::default(), tmp.path(), None).unwrap();

        let first = read(&tmp.path().join("view/1.html"));
        assert!(first.contains("1 of 13"));
        assert!(!first.contains(r#"class="fullscreen-prev""#));
        assert!(first.contains(r#"href="../view/2.html""#));

        let last = read(&tmp.path().join("view/13.html"));
        assert!(!last.contains(r#"class="fullscreen-next""#));
        assert!(last.contains(r#"href="../view/12.html""#));
        // Closing returns to the page holding the image
        assert!(last.contains(r#"data-close="../page-2.html""#));
    }

    #[test]
    fn details_pages_list_issues() {
        let tmp = TempDir::new().unwrap();
        let report = generate(&sample(), &SiteConfig::default(), tmp.path(), None).unwrap();
        assert_eq!(report.detail_pages, 3);

        let details = read(&tmp.path().join("details/img-2.html"));
        assert!(details.contains("<li>Contains banned keyword: stolen</li>"));
        assert!(details.contains(r#"data-close="../index.html""#));
        assert!(details.contains(r#"src="../Assets/img-2.png""#));
    }

    #[test]
    fn license_and_keyword_sections_filter() {
        let mut images = sample();
        images[1].license = "Public Domain".into();
        let tmp = TempDir::new().unwrap();
        generate(&images, &SiteConfig::default(), tmp.path(), None).unwrap();

        let public = read(&tmp.path().join("license/public-domain/index.html"));
        assert_eq!(count_occurrences(&public, r#"class="maka-gallery-item"#), 1);
        assert!(public.contains(r#"data-id="img-1""#));
        assert!(tmp.path().join("license/public-domain/view/1.html").exists());

        let black = read(&tmp.path().join("search/black/index.html"));
        assert_eq!(count_occurrences(&black, r#"class="maka-gallery-item"#), 1);
        assert!(black.contains(r#"href="../../search/black/view/1.html""#));
    }

    #[test]
    fn configured_view_mode_is_rendered() {
        let tmp = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.gallery.view_mode = crate::types::ViewMode::List;
        generate(&sample(), &config, tmp.path(), None).unwrap();
        let kids = read(&tmp.path().join("category/kids/index.html"));
        assert!(kids.contains(r#"class="maka-gallery-grid list-view""#));
        assert!(kids.contains(r#"data-view="list""#));
    }

    #[test]
    fn load_failure_page_shows_reload_message() {
        use crate::catalog::CatalogError;
        let tmp = TempDir::new().unwrap();
        let error = LoadError::Catalog(CatalogError::Io {
            path: PathBuf::from("assetsGallery.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        });
        write_load_failure(&error, &SiteConfig::default(), tmp.path()).unwrap();
        let html = read(&tmp.path().join("index.html"));
        assert!(html.contains("Failed to load gallery"));
        assert!(html.contains("retry-btn"));
        assert!(!html.contains("maka-gallery-grid"));
    }

    #[test]
    fn gallery_json_holds_records() {
        let tmp = TempDir::new().unwrap();
        generate(&sample(), &SiteConfig::default(), tmp.path(), None).unwrap();
        let json = read(&tmp.path().join("gallery.json"));
        let records: Vec<ImageRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(records, sample());
    }

    #[test]
    fn empty_gallery_still_writes_index() {
        let tmp = TempDir::new().unwrap();
        let report = generate(&[], &SiteConfig::default(), tmp.path(), None).unwrap();
        assert_eq!(report.sections.len(), 1);
        let html = read(&tmp.path().join("index.html"));
        assert_eq!(count_occurrences(&html, r#"class="no-results""#), 1);
    }

    #[test]
    fn css_carries_configured_colors() {
        let tmp = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.colors.light.primary = "#123456".into();
        generate(&[], &config, tmp.path(), None).unwrap();
        let html = read(&tmp.path().join("index.html"));
        assert!(html.contains("--color-primary: #123456"));
    }

    // =========================================================================
    // Assets
    // =========================================================================

    #[test]
    fn asset_index_uses_forward_slashes() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("Assets/Gallery Pictures")).unwrap();
        fs::write(tmp.path().join("Assets/Gallery Pictures/a.png"), b"png").unwrap();
        let index = AssetIndex::scan(tmp.path()).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains("Assets/Gallery Pictures/a.png"));
    }

    #[test]
    fn present_assets_are_copied_and_missing_use_placeholder() {
        let assets = TempDir::new().unwrap();
        fs::create_dir_all(assets.path().join("Assets")).unwrap();
        fs::write(assets.path().join("Assets/img-0.png"), b"png").unwrap();

        let out = TempDir::new().unwrap();
        let report = generate(
            &sample(),
            &SiteConfig::default(),
            out.path(),
            Some(assets.path()),
        )
        .unwrap();

        assert_eq!(report.assets_copied, 1);
        assert_eq!(report.missing_assets, vec!["Assets/img-1.png", "Assets/img-2.png"]);
        assert!(out.path().join("Assets/img-0.png").exists());

        let index = read(&out.path().join("index.html"));
        assert!(index.contains(r#"src="Assets/img-0.png""#));
        assert!(!index.contains(r#"src="Assets/img-1.png""#));
    }

    #[test]
    fn external_paths_are_never_missing() {
        let mut record = record("img-0", "hoodie");
        record.image_path = "https://cdn.example.com/a.png".into();
        record.thumbnail_path = "/static/a.png".into();
        let assets = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let report = generate(
            &[record],
            &SiteConfig::default(),
            out.path(),
            Some(assets.path()),
        )
        .unwrap();
        assert!(report.missing_assets.is_empty());
        assert_eq!(report.assets_copied, 0);
    }
}
