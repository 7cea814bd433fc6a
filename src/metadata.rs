//! Image metadata extraction and resolution.
//!
//! Catalog entries carry almost no structured data: an image path, a badge
//! and a marketing message. Everything the gallery filters on is derived
//! here from the image filename.
//!
//! ## Filename detection
//!
//! The last path segment is lowercased and matched against fixed keyword
//! lists by plain substring search:
//!
//! | Keywords | Result |
//! |----------|--------|
//! | `kids`, `niño`, `child` | category `Kids` |
//! | `adult`, `men`, `women`, `female`, `male` | category `Adults` |
//! | `hoodie` | category `Hoodies`, type `hoodie` |
//! | `jacket`, `chaqueta` | category `Jackets`, type `jacket` |
//! | `t-shirt`, `shirt`, `camiseta` | category `T-Shirts`, type `t-shirt` |
//! | color names | tag, and `color` |
//! | brand names | tag |
//!
//! Every matching color becomes a tag, but the `color` field keeps the
//! **last** match in [`COLOR_KEYWORDS`] order: `Black_White_Hoodie.png`
//! ends with `color = "white"`. Existing catalogs rely on this tie-break.
//!
//! Substring matching is deliberately naive (`"women"` also matches
//! `"men"`). An unmatched filename yields empty categories; the loader
//! applies the `Fashion` fallback.
//!
//! ## Resolution priority
//!
//! Display fields are resolved with [`resolve`]: the first non-empty value
//! wins, so a catalog message beats the configured placeholder and a
//! detected garment type beats the default title.

/// Colors in detection order. Later entries win the `color` field.
pub const COLOR_KEYWORDS: &[&str] = &[
    "black", "white", "blue", "red", "green", "yellow", "orange", "pink", "purple", "gray",
    "brown",
];

/// Brand names recognized as tags.
pub const BRAND_KEYWORDS: &[&str] = &[
    "superdry",
    "hollister",
    "champion",
    "columbia",
    "nike",
    "adidas",
];

/// Keyword groups mapping to a category and, for garments, a type.
const CATEGORY_RULES: &[(&[&str], &str, Option<&str>)] = &[
    (&["kids", "niño", "child"], "Kids", None),
    (&["adult", "men", "women", "female", "male"], "Adults", None),
    (&["hoodie"], "Hoodies", Some("hoodie")),
    (&["jacket", "chaqueta"], "Jackets", Some("jacket")),
    (&["t-shirt", "shirt", "camiseta"], "T-Shirts", Some("t-shirt")),
];

/// Attributes detected from a filename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub color: Option<String>,
    pub garment_type: Option<String>,
}

/// Last segment of a path, splitting on both `/` and `\`.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Detect categories, tags, color and garment type from a filename.
///
/// ```text
/// Black_Hoodie_For_Kids.png → categories [Kids, Hoodies], tags [black], type hoodie
/// plain.png                 → nothing
/// ```
pub fn extract_metadata_from_filename(filename: &str) -> FileMetadata {
    let name = file_name(filename).to_lowercase();
    let mut metadata = FileMetadata::default();

    for (keywords, category, garment_type) in CATEGORY_RULES {
        if keywords.iter().any(|k| name.contains(k)) {
            metadata.categories.push((*category).to_string());
            if let Some(t) = garment_type {
                metadata.garment_type = Some((*t).to_string());
            }
        }
    }

    // No early exit: the last matching color wins
    for color in COLOR_KEYWORDS {
        if name.contains(color) {
            metadata.color = Some((*color).to_string());
            metadata.tags.push((*color).to_string());
        }
    }

    for brand in BRAND_KEYWORDS {
        if name.contains(brand) {
            metadata.tags.push((*brand).to_string());
        }
    }

    metadata
}

/// Resolve a display field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value, trimmed.
///
/// ```text
/// title:       resolve(&[garment_type, Some(default_title)])
/// description: resolve(&[message,      Some(placeholder)])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

const MAX_SLUG_LEN: usize = 80;

/// Sanitize a string for use in URLs and filenames.
///
/// - Replaces non-alphanumeric characters (except dashes) with dashes
/// - Collapses consecutive dashes into one
/// - Strips leading and trailing dashes
/// - Lowercases the result
/// - Truncates to `MAX_SLUG_LEN` characters (breaks at last dash before limit)
pub fn sanitize_slug(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    let mut collapsed = String::with_capacity(slug.len());
    let mut prev_dash = false;
    for c in slug.chars() {
        if c == '-' {
            if !prev_dash {
                collapsed.push('-');
            }
            prev_dash = true;
        } else {
            collapsed.push(c);
            prev_dash = false;
        }
    }

    let trimmed = collapsed.trim_matches('-');

    if trimmed.len() <= MAX_SLUG_LEN {
        trimmed.to_string()
    } else {
        let truncated = &trimmed[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}
