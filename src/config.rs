//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are serialized to a TOML table and the user file is merged on top of it
//! key by key, so a config file only needs the values it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! asset_base = "Assets/"       # Prefix enforced on relative catalog paths
//!
//! [gallery]
//! title = "MAKA Visual Archive"
//! subtitle = "Discover exclusive fashion trends with proper licensing and compliance"
//! page_size = 12               # Cards per page
//! description_limit = 100      # Card description cutoff (characters)
//! card_categories = 3          # Category chips shown per card
//! categories = ["Kids", "Adults", "Hoodies", "Jackets", "T-Shirts", "Accessories"]
//! view_mode = "grid"           # "grid", "list" or "masonry"
//! base_url = ""                # Public site URL, used in share links
//!
//! [defaults]
//! title = "Fashion Item"
//! description = "Exclusive fashion piece"
//! badge = "Exclusive"
//! license = "CC-BY-4.0"
//! source = "MAKA Collection"
//! usage = "commercial"
//!
//! [moderation]
//! analyzer = "rules"           # "rules" or "simulated"
//! latency_ms = 500             # Simulated analysis delay
//! random_flag_rate = 0.05      # Simulated random flag probability (0-1)
//! # seed = 42                  # RNG seed; omit for OS entropy
//! licenses = ["CC-BY-4.0", "CC-BY-SA-4.0", "CC-BY-ND-4.0", "CC-BY-NC-4.0", "Public Domain"]
//! banned_keywords = ["nude", "porn", ...]
//!
//! [colors.light]
//! background = "#ffffff"
//! ...
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::{UsageClass, ViewMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Prefix enforced on relative catalog image paths.
    pub asset_base: String,
    /// Grid, pagination and header settings.
    pub gallery: GalleryConfig,
    /// Values filled into catalog entries that lack them.
    pub defaults: DefaultsConfig,
    /// Content review policy.
    pub moderation: ModerationConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            asset_base: "Assets/".to_string(),
            gallery: GalleryConfig::default(),
            defaults: DefaultsConfig::default(),
            moderation: ModerationConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gallery.page_size == 0 {
            return Err(ConfigError::Validation(
                "gallery.page_size must be non-zero".into(),
            ));
        }
        if self.gallery.description_limit == 0 {
            return Err(ConfigError::Validation(
                "gallery.description_limit must be non-zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.moderation.random_flag_rate) {
            return Err(ConfigError::Validation(
                "moderation.random_flag_rate must be between 0 and 1".into(),
            ));
        }
        if self.moderation.licenses.is_empty() {
            return Err(ConfigError::Validation(
                "moderation.licenses must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Grid, pagination and header settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    pub title: String,
    pub subtitle: String,
    /// Cards per page.
    pub page_size: usize,
    /// Card descriptions are cut at this many characters.
    pub description_limit: usize,
    /// Category chips shown per card.
    pub card_categories: usize,
    /// Options offered by the category filter.
    pub categories: Vec<String>,
    /// Layout the grid starts in.
    pub view_mode: ViewMode,
    /// Public URL of the generated site. Empty leaves the link out of
    /// shared descriptions.
    pub base_url: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: "MAKA Visual Archive".to_string(),
            subtitle: "Discover exclusive fashion trends with proper licensing and compliance"
                .to_string(),
            page_size: 12,
            description_limit: 100,
            card_categories: 3,
            categories: ["Kids", "Adults", "Hoodies", "Jackets", "T-Shirts", "Accessories"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            view_mode: ViewMode::Grid,
            base_url: String::new(),
        }
    }
}

/// Values filled into catalog entries that lack them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub title: String,
    pub description: String,
    pub badge: String,
    pub license: String,
    pub source: String,
    pub usage: UsageClass,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            title: "Fashion Item".to_string(),
            description: "Exclusive fashion piece".to_string(),
            badge: "Exclusive".to_string(),
            license: "CC-BY-4.0".to_string(),
            source: "MAKA Collection".to_string(),
            usage: UsageClass::Commercial,
        }
    }
}

/// Which analysis stage the moderator runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    /// Deterministic keyword rules only.
    #[default]
    Rules,
    /// Rules plus latency and seeded random flags.
    Simulated,
}

/// Content review policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModerationConfig {
    pub analyzer: AnalyzerKind,
    /// Simulated analysis delay in milliseconds.
    pub latency_ms: u64,
    /// Probability that the simulated analyzer flags a clean record.
    pub random_flag_rate: f64,
    /// RNG seed for the simulated analyzer. `None` seeds from the OS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Accepted license identifiers.
    pub licenses: Vec<String>,
    /// Words that flag a record when found in its text.
    pub banned_keywords: Vec<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerKind::Rules,
            latency_ms: 500,
            random_flag_rate: 0.05,
            seed: None,
            licenses: [
                "CC-BY-4.0",
                "CC-BY-SA-4.0",
                "CC-BY-ND-4.0",
                "CC-BY-NC-4.0",
                "Public Domain",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            banned_keywords: [
                "nude",
                "porn",
                "sex",
                "violence",
                "hate",
                "racist",
                "copyright",
                "trademark",
                "infringement",
                "stolen",
                "pirated",
                "illegal",
                "drugs",
                "weapons",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text: stats, card meta, pagination info.
    pub text_muted: String,
    /// Brand base color (header gradient start, pagination hover).
    pub primary: String,
    /// Brand accent (header gradient end, buttons).
    pub accent: String,
    /// Border around flagged cards.
    pub flagged: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            primary: "#0a1d6e".to_string(),
            accent: "#46a9f8".to_string(),
            flagged: "#ff9800".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            primary: "#1b3aa8".to_string(),
            accent: "#46a9f8".to_string(),
            flagged: "#ffb74d".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a `config.toml` path, falling back to stock defaults
/// when the file is absent.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_none() {
        tracing::debug!(path = %path.display(), "no config file, using stock defaults");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# MAKA Gallery Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Prefix enforced on relative catalog image paths.
asset_base = "Assets/"

# ---------------------------------------------------------------------------
# Gallery grid
# ---------------------------------------------------------------------------
[gallery]
title = "MAKA Visual Archive"
subtitle = "Discover exclusive fashion trends with proper licensing and compliance"

# Cards per page.
page_size = 12

# Card descriptions are cut at this many characters (no word boundary).
description_limit = 100

# Category chips shown on each card.
card_categories = 3

# Options offered by the category filter.
categories = ["Kids", "Adults", "Hoodies", "Jackets", "T-Shirts", "Accessories"]

# Layout the grid starts in: "grid", "list" or "masonry".
# Visitors can switch it on the page.
view_mode = "grid"

# Public URL of the site, e.g. "https://maka.example/gallery".
# Share links include the details page URL when set.
base_url = ""

# ---------------------------------------------------------------------------
# Defaults for catalog entries missing a value
# ---------------------------------------------------------------------------
[defaults]
title = "Fashion Item"
description = "Exclusive fashion piece"
badge = "Exclusive"
license = "CC-BY-4.0"
source = "MAKA Collection"
# One of "commercial", "editorial", "personal".
usage = "commercial"

# ---------------------------------------------------------------------------
# Moderation
# ---------------------------------------------------------------------------
[moderation]
# "rules" runs deterministic keyword rules.
# "simulated" adds a delay and random flags, standing in for a remote service.
analyzer = "rules"

# Simulated analysis delay in milliseconds.
latency_ms = 500

# Probability (0-1) that the simulated analyzer flags a clean record.
random_flag_rate = 0.05

# Seed for the simulated analyzer. Omit to seed from the OS.
# seed = 42

licenses = ["CC-BY-4.0", "CC-BY-SA-4.0", "CC-BY-ND-4.0", "CC-BY-NC-4.0", "Public Domain"]

banned_keywords = [
    "nude", "porn", "sex", "violence", "hate", "racist", "copyright", "trademark",
    "infringement", "stolen", "pirated", "illegal", "drugs", "weapons",
]

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # Stats, card meta, pagination
primary = "#0a1d6e"
accent = "#46a9f8"
flagged = "#ff9800"       # Border of flagged cards

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
primary = "#1b3aa8"
accent = "#46a9f8"
flagged = "#ffb74d"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-primary: {light_primary};
    --color-accent: {light_accent};
    --color-flagged: {light_flagged};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-primary: {dark_primary};
        --color-accent: {dark_accent};
        --color-flagged: {dark_flagged};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_primary = colors.light.primary,
        light_accent = colors.light.accent,
        light_flagged = colors.light.flagged,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_primary = colors.dark.primary,
        dark_accent = colors.dark.accent,
        dark_flagged = colors.dark.flagged,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_gallery_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.gallery.page_size, 12);
        assert_eq!(config.gallery.description_limit, 100);
        assert_eq!(config.gallery.categories.len(), 6);
        assert_eq!(config.asset_base, "Assets/");
    }

    #[test]
    fn default_config_has_moderation_policy() {
        let config = SiteConfig::default();
        assert_eq!(config.moderation.analyzer, AnalyzerKind::Rules);
        assert_eq!(config.moderation.licenses.len(), 5);
        assert!(config.moderation.banned_keywords.contains(&"stolen".to_string()));
        assert_eq!(config.moderation.seed, None);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[gallery]
page_size = 10

[colors.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.gallery.page_size, 10);
        assert_eq!(config.gallery.view_mode, ViewMode::Grid);
        assert_eq!(config.colors.light.background, "#fafafa");
        // Defaults preserved
        assert_eq!(config.gallery.description_limit, 100);
        assert_eq!(config.colors.light.text, "#111111");
        assert_eq!(config.defaults.license, "CC-BY-4.0");
    }

    #[test]
    fn parse_moderation_settings() {
        let toml = r#"
[moderation]
analyzer = "simulated"
latency_ms = 0
random_flag_rate = 0.5
seed = 7
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.moderation.analyzer, AnalyzerKind::Simulated);
        assert_eq!(config.moderation.latency_ms, 0);
        assert_eq!(config.moderation.seed, Some(7));
    }

    #[test]
    fn parse_view_mode_and_base_url() {
        let toml = r#"
[gallery]
view_mode = "masonry"
base_url = "https://maka.example"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.gallery.view_mode, ViewMode::Masonry);
        assert_eq!(config.gallery.base_url, "https://maka.example");
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r#"
[gallery]
pagesize = 10
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn merge_toml_overlay_wins_and_base_preserved() {
        let base: toml::Value = toml::from_str("a = 1\n[t]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[t]\ny = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["t"]["x"].as_integer(), Some(1));
        assert_eq!(merged["t"]["y"].as_integer(), Some(3));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.gallery.page_size, 12);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
asset_base = "media/"

[defaults]
source = "Studio"
usage = "editorial"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.asset_base, "media/");
        assert_eq!(config.defaults.source, "Studio");
        assert_eq!(config.defaults.usage, UsageClass::Editorial);
        assert_eq!(config.defaults.title, "Fashion Item");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_rejects_zero_page_size() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[gallery]\npage_size = 0\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_flag_rate() {
        let mut config = SiteConfig::default();
        config.moderation.random_flag_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.gallery.page_size, defaults.gallery.page_size);
        assert_eq!(config.moderation.licenses, defaults.moderation.licenses);
        assert_eq!(
            config.moderation.banned_keywords,
            defaults.moderation.banned_keywords
        );
        assert_eq!(config.colors.dark.flagged, defaults.colors.dark.flagged);
    }

    // =========================================================================
    // CSS generation tests
    // =========================================================================

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
        assert!(css.contains("--color-flagged:"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }
}
