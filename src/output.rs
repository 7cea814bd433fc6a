//! CLI output formatting for `build` and `check`.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every record is its positional index, title and moderation status,
//! with paths and issues shown as indented context lines. This reads as a
//! content inventory while still letting users trace a record back to its
//! catalog entry.
//!
//! # Output Format
//!
//! ## Load (`check`, and the first half of `build`)
//!
//! ```text
//! Catalog: embedded collection
//! 001 hoodie [approved]
//!     Source: Assets/Gallery Pictures/Black_Hoodie_For_Kids.png
//!     Categories: Kids, Hoodies
//! 002 jacket [flagged]
//!     Source: Assets/Gallery Pictures/Red_Jacket.png
//!     Categories: Jackets
//!     Issue: Contains banned keyword: stolen
//!
//! Moderation: 24 approved, 1 flagged (3 cached, 22 moderated (25 total))
//! ```
//!
//! ## Generate
//!
//! ```text
//! All → index.html (25 images, 3 pages)
//! Kids → category/kids/index.html (8 images, 1 page)
//! CC-BY-4.0 → license/cc-by-4-0/index.html (25 images, 3 pages)
//! "black" → search/black/index.html (6 images, 1 page)
//! Details → details/ (25 pages)
//! Assets: 23 copied, 2 missing
//!     Missing: Assets/Gallery Pictures/Orange_Hoodie.png
//!
//! Generated 6 sections, 95 pages in dist
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::GenerateReport;
use crate::load::LoadOutput;
use crate::types::ImageRecord;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 page`, `3 pages`.
fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Record header: positional index, title and moderation status.
///
/// ```text
/// 001 hoodie [approved]
/// ```
fn record_header(index: usize, record: &ImageRecord) -> String {
    format!(
        "{} {} [{}]",
        format_index(index),
        record.title,
        record.moderation_status
    )
}

// ============================================================================
// Load
// ============================================================================

/// Format a moderated batch: one entry per record, then a summary.
pub fn format_load_output(output: &LoadOutput, source: &str) -> Vec<String> {
    let mut lines = vec![format!("Catalog: {source}")];

    for (i, record) in output.images.iter().enumerate() {
        lines.push(record_header(i + 1, record));
        lines.push(format!("{}Source: {}", indent(1), record.image_path));
        lines.push(format!(
            "{}Categories: {}",
            indent(1),
            record.categories.join(", ")
        ));
        for issue in &record.moderation_issues {
            lines.push(format!("{}Issue: {}", indent(1), issue));
        }
    }

    let flagged = output.flagged_count();
    let approved = output.images.len() - flagged;
    lines.push(String::new());
    lines.push(format!(
        "Moderation: {approved} approved, {flagged} flagged ({})",
        output.cache_stats
    ));
    lines
}

/// Print load output to stdout.
pub fn print_load_output(output: &LoadOutput, source: &str) {
    for line in format_load_output(output, source) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format the pages written by a site build.
pub fn format_generate_output(report: &GenerateReport, output_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for section in &report.sections {
        lines.push(format!(
            "{} \u{2192} {}index.html ({}, {})",
            section.section.label(),
            section.path,
            plural(section.images, "image"),
            plural(section.pages, "page")
        ));
    }

    lines.push(format!(
        "Details \u{2192} details/ ({})",
        plural(report.detail_pages, "page")
    ));

    if report.assets_copied > 0 || !report.missing_assets.is_empty() {
        lines.push(format!(
            "Assets: {} copied, {} missing",
            report.assets_copied,
            report.missing_assets.len()
        ));
        for path in &report.missing_assets {
            lines.push(format!("{}Missing: {}", indent(1), path));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {} in {}",
        plural(report.sections.len(), "section"),
        plural(report.total_pages(), "page"),
        output_dir.display()
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport, output_dir: &Path) {
    for line in format_generate_output(report, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
