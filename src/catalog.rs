//! Catalog sources.
//!
//! The catalog is the raw list of gallery entries before enrichment: an
//! image path, a badge and a marketing message per item. It comes from one
//! of two places:
//!
//! - [`EmbeddedCatalog`]: the brand's collection compiled into the binary,
//!   so a gallery can be built with no input files at all.
//! - [`JsonCatalog`]: a JSON array on disk (`assetsGallery.json`).
//!
//! Both implement [`CatalogSource`], which is the only thing the loader
//! knows about. Image paths are normalized by [`normalize_image_path`]
//! after loading, whichever source they came from.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One raw catalog record: `{ "image": ..., "badge": ..., "message": ... }`.
///
/// `badge` and `message` are optional; the loader fills placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub image: String,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CatalogEntry {
    pub fn new(image: &str, badge: &str, message: &str) -> Self {
        Self {
            image: image.to_string(),
            badge: Some(badge.to_string()),
            message: Some(message.to_string()),
        }
    }
}

/// Where catalog entries come from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short label for logs and CLI output.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError>;
}

/// The brand collection compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedCatalog;

/// `(image, badge, message)` for the built-in collection.
const EMBEDDED_ENTRIES: &[(&str, &str, &str)] = &[
    (
        "Gallery Pictures/Beisball_Hoodie_For_Kids.png",
        "Kids Exclusive",
        "Swing for the stars. Baseball style for young champs.",
    ),
    (
        "Gallery Pictures/Beisball_Jacket_For_Kids.png",
        "Adventure Ready",
        "Gear up for victory. Jacket that champions play.",
    ),
    (
        "Gallery Pictures/Black_Green_Hoodie.png",
        "Urban Edge",
        "Dark and vibrant. Command the streets with contrast.",
    ),
    (
        "Gallery Pictures/Black_Orange_Hoodie.png",
        "Bold Contrast",
        "Black meets orange. SuperDry for the fearless.",
    ),
    (
        "Gallery Pictures/Black_white_Hoodie.png",
        "Classic Black",
        "Timeless darkness. SuperDry elegance redefined.",
    ),
    (
        "Gallery Pictures/Blue_Champion_Hoodie_For_Kids.png",
        "Champion Kids",
        "Blue victory. Champion spirit for little winners.",
    ),
    (
        "Gallery Pictures/Blue_Hoodie.png",
        "Ocean Calm",
        "Dive into blue. SuperDry serenity.",
    ),
    (
        "Gallery Pictures/Brown_Hoodie_For_Kids.png",
        "Nature's Child",
        "Brown earth tones. SuperDry for grounded kids.",
    ),
    (
        "Gallery Pictures/Blue_and_White_Jacket_For_Kids_Opened.png",
        "Sky Columbia",
        "Blue skies ahead. Columbia for youthful journeys.",
    ),
    (
        "Gallery Pictures/Columbia_Green_Jacket_For_Kids.png",
        "Eco Columbia",
        "Green guardian. Columbia for eco-kids.",
    ),
    (
        "Gallery Pictures/Red_Jacket_For_Kids_Opened.png",
        "Red Energy",
        "Fiery red. Columbia jacket for energetic kids.",
    ),
    (
        "Gallery Pictures/Yellow_Jacket_For_Kids.png",
        "Bright Columbia",
        "Vibrant yellow. Columbia jacket for bright futures.",
    ),
    (
        "Gallery Pictures/Adults_Jackets.jpeg",
        "Adult Columbia",
        "Mature adventures. Columbia for the seasoned explorer.",
    ),
    (
        "Gallery Pictures/Light_Purple_Hoodie.png",
        "Light Purple",
        "Subtle purple. SuperDry mystery.",
    ),
    (
        "Gallery Pictures/Gray_Blue_Hoodie.png",
        "Gray Blue Mix",
        "Gray meets blue. SuperDry tranquility.",
    ),
    (
        "Gallery Pictures/Green_Hoodie.jpeg",
        "Pure Green",
        "Vivid green. SuperDry freshness.",
    ),
    (
        "Gallery Pictures/Lime_Hoddie_For_Kids.png",
        "Lime Kids",
        "Lime green. Hollister for fun kids.",
    ),
    (
        "Gallery Pictures/Orange_Hoodie_For_Kids.png",
        "Orange Hollister",
        "Vibrant orange. Hollister for energetic kids.",
    ),
    (
        "Gallery Pictures/Pink_Hoodie.jpeg",
        "Pink SuperDry",
        "Pink power. SuperDry softness.",
    ),
    (
        "Gallery Pictures/Red_Hoodie_For_Kids.png",
        "Red Kids",
        "Fiery red. SuperDry for bold kids.",
    ),
    (
        "Gallery Pictures/Salmon.png",
        "Brand Ref 2",
        "Second brand. Style reference.",
    ),
    (
        "Gallery Pictures/Female_Hoodie_Style.png",
        "Female Style",
        "Feminine touch. SuperDry for her.",
    ),
    (
        "Gallery Pictures/White_Black_Hoodie.png",
        "White Black",
        "White on black. SuperDry contrast.",
    ),
    (
        "Gallery Pictures/Yellow_Hoodie_with_Zip.png",
        "Yellow Zip",
        "Yellow with zip. SuperDry ready.",
    ),
    (
        "Gallery Pictures/Black_Light_Green_Hollister_Hoodie_for_Kids.png",
        "Hollister Youth",
        "Light green Hollister hoodie for kids.",
    ),
];

impl EmbeddedCatalog {
    pub fn entries() -> Vec<CatalogEntry> {
        EMBEDDED_ENTRIES
            .iter()
            .map(|(image, badge, message)| CatalogEntry::new(image, badge, message))
            .collect()
    }
}

#[async_trait]
impl CatalogSource for EmbeddedCatalog {
    fn describe(&self) -> String {
        "embedded collection".to_string()
    }

    async fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(Self::entries())
    }
}

/// A JSON array of catalog entries on disk.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    pub path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonCatalog {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| CatalogError::Io {
                    path: self.path.clone(),
                    source,
                })?;
        serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

/// Normalize a catalog image path for use as a web URL.
///
/// - Trims surrounding whitespace
/// - Converts backslashes to forward slashes (runs collapse to one)
/// - Strips leading `./` and `../` segments
/// - Prepends `base` unless the path already starts with it or is absolute
///
/// An empty `base` disables prefixing.
///
/// ```text
/// "Gallery Pictures\\Blue_Hoodie.png" → "Assets/Gallery Pictures/Blue_Hoodie.png"
/// "./Assets/x.png"                    → "Assets/x.png"
/// "/cdn/x.png"                        → "/cdn/x.png"
/// ```
pub fn normalize_image_path(original: &str, base: &str) -> String {
    let mut normalized = String::with_capacity(original.len() + base.len());
    let mut prev_backslash = false;
    for c in original.trim().chars() {
        if c == '\\' {
            if !prev_backslash {
                normalized.push('/');
            }
            prev_backslash = true;
        } else {
            normalized.push(c);
            prev_backslash = false;
        }
    }

    let mut path = normalized.as_str();
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix("../") {
            path = rest;
        } else {
            break;
        }
    }

    if base.is_empty() || path.starts_with(base) || path.starts_with('/') {
        path.to_string()
    } else {
        format!("{base}{path}")
    }
}
