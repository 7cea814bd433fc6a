//! Moderation verdict cache for repeated builds.
//!
//! With the simulated analyzer every record costs a fixed delay, and a real
//! classifier behind the [`Analyzer`](crate::moderation::Analyzer) seam
//! costs a network round trip. This module lets the loader skip moderation
//! when neither the record content nor the moderation policy has changed
//! since the last build.
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: lookups are by the combination of
//! `content_hash` and `policy_hash`, not by record id. Reordering the
//! catalog shifts ids but does not invalidate verdicts.
//!
//! - **`content_hash`**: SHA-256 over every field moderation reads (title,
//!   description, tags, license, source, usage).
//! - **`policy_hash`**: SHA-256 over the moderation config (analyzer kind,
//!   flag rate, seed, licenses, banned keywords). Changing any policy
//!   value re-moderates everything.
//!
//! Verdicts with reason `error` are never stored, so a transient service
//! failure is retried on the next build.
//!
//! ## Storage
//!
//! The cache is a JSON file at `<temp_dir>/.moderation-cache.json`.
//! Unreadable or version-mismatched files load as an empty cache.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `build` or `check` to moderate every record again.

use crate::config::ModerationConfig;
use crate::moderation::{ModerationReason, ModerationResult};
use crate::types::ImageRecord;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache file within the temp directory.
const CACHE_FILENAME: &str = ".moderation-cache.json";

/// Version of the cache format. Bump to invalidate all existing caches.
const CACHE_VERSION: u32 = 1;

/// On-disk map of `"{content_hash}:{policy_hash}"` to a verdict.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModerationCache {
    pub version: u32,
    pub entries: HashMap<String, ModerationResult>,
}

impl ModerationCache {
    /// Create an empty cache (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: CACHE_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the temp directory. Returns an empty cache if the file
    /// doesn't exist or can't be parsed.
    pub fn load(dir: &Path) -> Self {
        let path = cache_path(dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let cache: Self = match serde_json::from_str(&content) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable moderation cache");
                return Self::empty();
            }
        };
        if cache.version != CACHE_VERSION {
            return Self::empty();
        }
        cache
    }

    /// Save to the temp directory.
    pub fn save(&self, dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(cache_path(dir), json)
    }

    pub fn get(&self, content_hash: &str, policy_hash: &str) -> Option<&ModerationResult> {
        self.entries.get(&key(content_hash, policy_hash))
    }

    /// Store a verdict. Error verdicts are skipped.
    pub fn insert(&mut self, content_hash: &str, policy_hash: &str, result: ModerationResult) {
        if result.reason == ModerationReason::Error {
            return;
        }
        self.entries.insert(key(content_hash, policy_hash), result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn key(content_hash: &str, policy_hash: &str) -> String {
    format!("{content_hash}:{policy_hash}")
}

/// SHA-256 of the record fields moderation reads, as a hex string.
pub fn hash_record(record: &ImageRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"record\0");
    for field in [
        &record.title,
        &record.description,
        &record.license,
        &record.source,
    ] {
        hasher.update(field.as_bytes());
        hasher.update(b"\0");
    }
    for tag in &record.tags {
        hasher.update(tag.as_bytes());
        hasher.update(b"\x1f");
    }
    hasher.update(format!("{:?}", record.usage).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of the moderation policy, as a hex string.
pub fn hash_policy(config: &ModerationConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"policy\0");
    hasher.update(format!("{:?}", config.analyzer).as_bytes());
    hasher.update(config.random_flag_rate.to_le_bytes());
    match config.seed {
        Some(seed) => {
            hasher.update(b"\x01");
            hasher.update(seed.to_le_bytes());
        }
        None => hasher.update(b"\x00"),
    }
    for license in &config.licenses {
        hasher.update(license.as_bytes());
        hasher.update(b"\x1f");
    }
    hasher.update(b"\0");
    for keyword in &config.banned_keywords {
        hasher.update(keyword.as_bytes());
        hasher.update(b"\x1f");
    }
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for one load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} moderated ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} moderated", self.misses)
        }
    }
}

/// Resolve the cache file path for a temp directory.
pub fn cache_path(dir: &Path) -> PathBuf {
    dir.join(CACHE_FILENAME)
}
