//! # MAKA Gallery
//!
//! A filterable, moderated fashion gallery. A catalog of images with little
//! more than a path and a marketing line is enriched from filenames, run
//! through content moderation, and rendered as a browsable gallery with
//! search, category and license filters, pagination, a lightbox and a
//! details view.
//!
//! # Architecture: Load, then Render
//!
//! ```text
//! 1. Load      catalog    →  Vec<ImageRecord>   (enrich + moderate, all or nothing)
//! 2. State     records    →  GalleryState       (category index, filtered view)
//! 3. Render    GalleryUI  →  HTML               (one page per reachable UI state)
//! ```
//!
//! Loading is the only asynchronous stage. Filtering and rendering are pure
//! functions of the loaded records and the visitor's selection, so unit
//! tests drive the UI with plain method calls and inspect the markup.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Catalog sources (embedded collection, JSON file) and path normalization |
//! | [`metadata`] | Filename keyword detection, field resolution, slugs |
//! | [`moderation`] | Metadata, analysis and license checks; the `Analyzer` seam |
//! | [`cache`] | Content-addressed moderation verdict cache |
//! | [`load`] | Enrichment and concurrent moderation of a whole catalog |
//! | [`state`] | Loaded records, category index and filtering |
//! | [`ui`] | Interaction state (filters, pages, lightbox, details) and rendering |
//! | [`generate`] | Writes the gallery as a static site |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Shared record and enum types |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Deterministic Moderation
//!
//! Moderation runs behind the [`moderation::Analyzer`] trait. The default
//! analyzer is rule-based and fully deterministic. The simulated analyzer,
//! which adds latency and random flags for demos, draws from a seedable RNG,
//! so a fixed seed reproduces a build exactly.
//!
//! ## One Gallery, Two Sources
//!
//! The gallery is the same whether its catalog is compiled in or read from
//! disk: [`catalog::CatalogSource`] is the only thing the loader sees.
//!
//! ## Explicit Construction
//!
//! There are no global singletons. The binary builds the config, the loader
//! and each [`ui::GalleryUI`] explicitly and passes them where needed.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod generate;
pub mod load;
pub mod metadata;
pub mod moderation;
pub mod output;
pub mod state;
pub mod types;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_helpers;
