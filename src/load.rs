//! Catalog loading and enrichment.
//!
//! Turns a [`CatalogSource`] into a batch of moderated [`ImageRecord`]s:
//!
//! ```text
//! fetch catalog → normalize path → extract filename metadata → fill defaults
//!               → moderate (concurrently, per record) → batch
//! ```
//!
//! The batch is returned only once every record has a final moderation
//! status, so callers never publish a partially moderated gallery.
//!
//! ## Failure isolation
//!
//! A catalog that cannot be fetched fails the whole load. Anything that
//! goes wrong for a single record is contained in that record: moderation
//! errors surface as a flagged record with a generic issue, never as a
//! missing record or an aborted batch.
//!
//! ## Single flight
//!
//! A [`GalleryLoader`] runs one load at a time. A second call while a load
//! is in flight is rejected with [`LoadError::LoadInProgress`] rather than
//! queued or raced.

use crate::cache::{self, CacheStats, ModerationCache};
use crate::catalog::{CatalogEntry, CatalogError, CatalogSource, normalize_image_path};
use crate::config::SiteConfig;
use crate::metadata::{self, extract_metadata_from_filename, resolve};
use crate::moderation::{ContentModerator, ModerationResult};
use crate::types::{FALLBACK_CATEGORY, ImageRecord, ModerationStatus};
use chrono::Utc;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Number of message words copied into a record's tags.
const MESSAGE_TAG_WORDS: usize = 3;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("a gallery load is already in progress")]
    LoadInProgress,
}

/// Result of one load.
#[derive(Debug)]
pub struct LoadOutput {
    pub images: Vec<ImageRecord>,
    pub cache_stats: CacheStats,
}

impl LoadOutput {
    pub fn flagged_count(&self) -> usize {
        self.images.iter().filter(|i| i.is_flagged()).count()
    }
}

/// Loads and enriches catalogs. Owns the moderator and the verdict cache.
pub struct GalleryLoader {
    config: SiteConfig,
    moderator: ContentModerator,
    cache: tokio::sync::Mutex<ModerationCache>,
    policy_hash: String,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a load ends, however it ends.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl GalleryLoader {
    pub fn new(config: SiteConfig, moderator: ContentModerator, cache: ModerationCache) -> Self {
        let policy_hash = cache::hash_policy(&config.moderation);
        Self {
            config,
            moderator,
            cache: tokio::sync::Mutex::new(cache),
            policy_hash,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Loader with the analyzer selected by config and an empty cache.
    pub fn from_config(config: SiteConfig) -> Self {
        let moderator = ContentModerator::from_config(&config.moderation);
        Self::new(config, moderator, ModerationCache::empty())
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Fetch, enrich and moderate a catalog.
    pub async fn load(&self, source: &dyn CatalogSource) -> Result<LoadOutput, LoadError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("rejecting gallery load: another load is in flight");
            return Err(LoadError::LoadInProgress);
        }
        let _guard = FlightGuard(&self.in_flight);

        tracing::info!(source = %source.describe(), "loading gallery catalog");
        let entries = source.fetch().await?;
        tracing::info!(count = entries.len(), "catalog entries fetched");

        let drafts: Vec<ImageRecord> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| self.enrich(index, entry))
            .collect();

        let verdicts = join_all(drafts.iter().map(|draft| self.moderate_cached(draft))).await;

        let mut cache_stats = CacheStats::default();
        let images = drafts
            .into_iter()
            .zip(verdicts)
            .map(|(mut record, (verdict, cached))| {
                if cached {
                    cache_stats.hit();
                } else {
                    cache_stats.miss();
                }
                self.apply_verdict(&mut record, verdict);
                record
            })
            .collect::<Vec<_>>();

        tracing::info!(
            count = images.len(),
            cache = %cache_stats,
            "gallery catalog processed"
        );
        Ok(LoadOutput {
            images,
            cache_stats,
        })
    }

    /// Consume the loader and return its cache for saving.
    pub fn into_cache(self) -> ModerationCache {
        self.cache.into_inner()
    }

    /// Build an unmoderated record from a catalog entry.
    fn enrich(&self, index: usize, entry: &CatalogEntry) -> ImageRecord {
        let defaults = &self.config.defaults;
        let image_path = normalize_image_path(&entry.image, &self.config.asset_base);
        let file_meta = extract_metadata_from_filename(metadata::file_name(&image_path));
        tracing::debug!(index, path = %image_path, "processing catalog entry");

        let categories = if file_meta.categories.is_empty() {
            vec![FALLBACK_CATEGORY.to_string()]
        } else {
            file_meta.categories
        };

        let message = entry.message.as_deref();
        let mut tags = file_meta.tags;
        tags.extend(
            message
                .unwrap_or_default()
                .split_whitespace()
                .take(MESSAGE_TAG_WORDS)
                .map(String::from),
        );

        let title = resolve(&[file_meta.garment_type.as_deref(), Some(&defaults.title)])
            .unwrap_or_default();
        let description =
            resolve(&[message, Some(&defaults.description)]).unwrap_or_default();
        let badge =
            resolve(&[entry.badge.as_deref(), Some(&defaults.badge)]).unwrap_or_default();

        ImageRecord {
            id: format!("img-{index}"),
            title,
            safe_description: description.clone(),
            description,
            thumbnail_path: image_path.clone(),
            image_path,
            badge,
            categories,
            tags,
            color: file_meta.color,
            garment_type: file_meta.garment_type,
            license: defaults.license.clone(),
            source: defaults.source.clone(),
            usage: defaults.usage,
            moderation_status: ModerationStatus::Pending,
            moderation_issues: Vec::new(),
            date_added: Utc::now(),
        }
    }

    /// Moderate through the cache. Returns the verdict and whether it was cached.
    async fn moderate_cached(&self, record: &ImageRecord) -> (ModerationResult, bool) {
        let content_hash = cache::hash_record(record);
        if let Some(hit) = self.cache.lock().await.get(&content_hash, &self.policy_hash) {
            return (hit.clone(), true);
        }
        let verdict = self.moderator.moderate(record).await;
        self.cache
            .lock()
            .await
            .insert(&content_hash, &self.policy_hash, verdict.clone());
        (verdict, false)
    }

    fn apply_verdict(&self, record: &mut ImageRecord, verdict: ModerationResult) {
        if verdict.safe {
            record.moderation_status = ModerationStatus::Approved;
        } else {
            tracing::warn!(
                id = %record.id,
                reason = ?verdict.reason,
                issues = ?verdict.issues,
                "image failed moderation"
            );
            record.moderation_status = ModerationStatus::Flagged;
            record.moderation_issues = verdict.issues;
        }
        record.safe_description = self.moderator.generate_safe_description(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EmbeddedCatalog;
    use crate::config::ModerationConfig;
    use crate::moderation::{AnalysisResult, Analyzer, ModerationError, RuleAnalyzer};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    struct StaticCatalog(Vec<CatalogEntry>);

    #[async_trait]
    impl CatalogSource for StaticCatalog {
        fn describe(&self) -> String {
            "test catalog".into()
        }

        async fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
            Ok(self.0.clone())
        }
    }

    /// Fails for titles containing "jacket", counts calls.
    struct FlakyAnalyzer(Arc<AtomicUsize>);

    #[async_trait]
    impl Analyzer for FlakyAnalyzer {
        async fn analyze(&self, record: &ImageRecord) -> Result<AnalysisResult, ModerationError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            if record.title.contains("jacket") {
                Err(ModerationError::Service("boom".into()))
            } else {
                Ok(AnalysisResult::safe())
            }
        }
    }

    /// Holds every analysis open until released, to keep a load in flight.
    struct GateAnalyzer(Arc<tokio::sync::Notify>);

    #[async_trait]
    impl Analyzer for GateAnalyzer {
        async fn analyze(&self, _: &ImageRecord) -> Result<AnalysisResult, ModerationError> {
            self.0.notified().await;
            Ok(AnalysisResult::safe())
        }
    }

    fn loader_with(analyzer: Box<dyn Analyzer>) -> GalleryLoader {
        let config = SiteConfig::default();
        let moderator = ContentModerator::new(&config.moderation, analyzer);
        GalleryLoader::new(config, moderator, ModerationCache::empty())
    }

    fn entry(image: &str, message: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            image: image.to_string(),
            badge: None,
            message: message.map(String::from),
        }
    }

    #[tokio::test]
    async fn enriches_entries_from_filename_and_defaults() {
        let loader = loader_with(Box::new(RuleAnalyzer));
        let catalog = StaticCatalog(vec![
            entry(
                "Gallery\\Black_Hoodie_For_Kids.png",
                Some("Light up the darkness. Hollister for the bold kids."),
            ),
            entry("plain.png", None),
        ]);

        let out = loader.load(&catalog).await.unwrap();
        let hoodie = &out.images[0];
        assert_eq!(hoodie.id, "img-0");
        assert_eq!(hoodie.title, "hoodie");
        assert_eq!(hoodie.image_path, "Assets/Gallery/Black_Hoodie_For_Kids.png");
        assert_eq!(hoodie.thumbnail_path, hoodie.image_path);
        assert_eq!(hoodie.categories, vec!["Kids", "Hoodies"]);
        assert_eq!(hoodie.tags, vec!["black", "Light", "up", "the"]);
        assert_eq!(hoodie.badge, "Exclusive");
        assert_eq!(hoodie.moderation_status, ModerationStatus::Approved);

        let plain = &out.images[1];
        assert_eq!(plain.id, "img-1");
        assert_eq!(plain.title, "Fashion Item");
        assert_eq!(plain.description, "Exclusive fashion piece");
        assert_eq!(plain.categories, vec![FALLBACK_CATEGORY]);
        assert!(plain.tags.is_empty());
    }

    #[tokio::test]
    async fn every_record_leaves_pending() {
        let loader = loader_with(Box::new(RuleAnalyzer));
        let out = loader.load(&EmbeddedCatalog).await.unwrap();
        assert_eq!(out.images.len(), EmbeddedCatalog::entries().len());
        assert!(
            out.images
                .iter()
                .all(|i| i.moderation_status != ModerationStatus::Pending)
        );
        assert!(out.images.iter().all(|i| !i.categories.is_empty()));
    }

    #[tokio::test]
    async fn ids_are_unique_within_a_batch() {
        let loader = loader_with(Box::new(RuleAnalyzer));
        let out = loader.load(&EmbeddedCatalog).await.unwrap();
        let mut ids: Vec<&str> = out.images.iter().map(|i| i.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), out.images.len());
    }

    #[tokio::test]
    async fn per_record_failure_is_isolated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = loader_with(Box::new(FlakyAnalyzer(calls.clone())));
        let catalog = StaticCatalog(vec![
            entry("Red_Jacket.png", Some("Fiery red.")),
            entry("Blue_Hoodie.png", Some("Dive into blue.")),
        ]);

        let out = loader.load(&catalog).await.unwrap();
        assert_eq!(out.images.len(), 2);
        assert_eq!(out.images[0].moderation_status, ModerationStatus::Flagged);
        assert_eq!(
            out.images[0].moderation_issues,
            vec![crate::moderation::SERVICE_UNAVAILABLE]
        );
        assert_eq!(out.images[1].moderation_status, ModerationStatus::Approved);
        assert_eq!(out.flagged_count(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn banned_message_is_flagged_and_redacted() {
        let loader = loader_with(Box::new(RuleAnalyzer));
        let catalog = StaticCatalog(vec![entry("x.png", Some("Totally stolen design"))]);
        let out = loader.load(&catalog).await.unwrap();
        let r = &out.images[0];
        assert!(r.is_flagged());
        assert!(r.moderation_issues[0].contains("stolen"));
        assert!(r.safe_description.contains("[REDACTED]"));
        assert!(r.safe_description.contains("Source: MAKA Collection"));
    }

    #[tokio::test]
    async fn second_load_hits_cache_and_skips_analysis() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = loader_with(Box::new(FlakyAnalyzer(calls.clone())));
        let catalog = StaticCatalog(vec![
            entry("Blue_Hoodie.png", Some("Dive into blue.")),
            entry("Red_Jacket.png", Some("Fiery red.")),
        ]);

        let first = loader.load(&catalog).await.unwrap();
        assert_eq!(first.cache_stats.misses, 2);
        let second = loader.load(&catalog).await.unwrap();
        // The approved verdict is cached; the error verdict is retried
        assert_eq!(second.cache_stats.hits, 1);
        assert_eq!(second.cache_stats.misses, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn concurrent_second_load_is_rejected() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let loader = loader_with(Box::new(GateAnalyzer(gate.clone())));
        let catalog = StaticCatalog(vec![entry("Blue_Hoodie.png", Some("Blue."))]);

        let first = loader.load(&catalog);
        let second = async {
            // Give the first load a chance to start
            tokio::task::yield_now().await;
            let result = loader.load(&catalog).await;
            gate.notify_waiters();
            gate.notify_one();
            result
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert!(matches!(second, Err(LoadError::LoadInProgress)));
        // The flag is cleared once the first load completes
        gate.notify_one();
        assert!(loader.load(&catalog).await.is_ok());
    }

    #[tokio::test]
    async fn catalog_failure_fails_the_load() {
        let loader = loader_with(Box::new(RuleAnalyzer));
        let catalog = crate::catalog::JsonCatalog::new("/nonexistent/assetsGallery.json");
        let result = loader.load(&catalog).await;
        assert!(matches!(result, Err(LoadError::Catalog(_))));
        // The failed load released the in-flight flag
        assert!(loader.load(&EmbeddedCatalog).await.is_ok());
    }

    #[test]
    fn moderation_config_default_used_by_from_config() {
        let loader = GalleryLoader::from_config(SiteConfig::default());
        assert_eq!(
            loader.config().moderation.licenses,
            ModerationConfig::default().licenses
        );
    }
}
