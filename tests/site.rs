//! End-to-end: catalog file → load and moderate → static site on disk.

use maka_gal::cache::ModerationCache;
use maka_gal::catalog::{EmbeddedCatalog, JsonCatalog};
use maka_gal::config::SiteConfig;
use maka_gal::generate;
use maka_gal::load::{GalleryLoader, LoadError};
use maka_gal::moderation::ContentModerator;
use maka_gal::types::ModerationStatus;
use maka_gal::ui::{GalleryUI, Links, Phase};
use std::fs;
use tempfile::TempDir;

const CATALOG: &str = r#"[
    { "image": "Gallery Pictures\\Black_Hoodie_For_Kids.png", "badge": "Superdry Kids", "message": "Stay cozy and stylish." },
    { "image": "./Gallery Pictures/Red_Jacket_Columbia.png", "message": "A stolen design." },
    { "image": "plain.png" }
]"#;

fn write_catalog(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("assetsGallery.json");
    fs::write(&path, CATALOG).unwrap();
    path
}

#[tokio::test]
async fn json_catalog_builds_moderated_site() {
    let tmp = TempDir::new().unwrap();
    let catalog = JsonCatalog::new(write_catalog(&tmp));
    let config = SiteConfig::default();
    let loader = GalleryLoader::from_config(config.clone());

    let loaded = loader.load(&catalog).await.unwrap();
    assert_eq!(loaded.images.len(), 3);
    assert_eq!(loaded.images[0].categories, vec!["Kids", "Hoodies"]);
    assert_eq!(
        loaded.images[0].image_path,
        "Assets/Gallery Pictures/Black_Hoodie_For_Kids.png"
    );
    assert_eq!(loaded.images[1].moderation_status, ModerationStatus::Flagged);
    assert_eq!(loaded.images[2].categories, vec!["Fashion"]);
    assert_eq!(loaded.images[2].description, "Exclusive fashion piece");

    let out = tmp.path().join("dist");
    let report = generate::generate(&loaded.images, &config, &out, None).unwrap();
    assert_eq!(report.detail_pages, 3);

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(index.contains("maka-gallery-container"));
    assert!(index.contains("moderation-flagged"));
    assert!(out.join("category/fashion/index.html").exists());
    assert!(out.join("category/jackets/view/1.html").exists());
    assert!(out.join("license/cc-by-4-0/index.html").exists());
    assert!(out.join("search/columbia/index.html").exists());
    let black = fs::read_to_string(out.join("search/black/index.html")).unwrap();
    assert!(black.contains("Black_Hoodie_For_Kids.png"));
    assert!(!black.contains("Red_Jacket_Columbia.png"));

    let details = fs::read_to_string(out.join("details/img-1.html")).unwrap();
    assert!(details.contains("Contains banned keyword: stolen"));
    assert!(details.contains("[REDACTED]"));
}

#[tokio::test]
async fn missing_catalog_renders_failure_state() {
    let tmp = TempDir::new().unwrap();
    let config = SiteConfig::default();
    let loader = GalleryLoader::from_config(config.clone());
    let catalog = JsonCatalog::new(tmp.path().join("missing.json"));

    let mut ui = GalleryUI::new(&config, Links::Interactive);
    ui.load(&loader, &catalog).await;
    assert!(matches!(ui.phase(), Phase::Failed(_)));
    assert!(ui.render().into_string().contains("Failed to load gallery"));

    // The failure released the loader for a retry
    ui.load(&loader, &EmbeddedCatalog).await;
    assert_eq!(ui.phase(), &Phase::Ready);
    assert_eq!(
        ui.state().all_images().len(),
        EmbeddedCatalog::entries().len()
    );
}

#[tokio::test]
async fn failed_load_leaves_reload_page() {
    let tmp = TempDir::new().unwrap();
    let config = SiteConfig::default();
    let loader = GalleryLoader::from_config(config.clone());
    let error = loader
        .load(&JsonCatalog::new(tmp.path().join("missing.json")))
        .await
        .unwrap_err();

    let out = tmp.path().join("dist");
    generate::write_load_failure(&error, &config, &out).unwrap();
    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(index.contains("maka-gallery-container"));
    assert!(index.contains("Failed to load gallery"));
}

#[tokio::test]
async fn malformed_catalog_is_a_load_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    fs::write(&path, "{ not json").unwrap();
    let loader = GalleryLoader::from_config(SiteConfig::default());
    let result = loader.load(&JsonCatalog::new(path)).await;
    assert!(matches!(result, Err(LoadError::Catalog(_))));
}

#[tokio::test]
async fn cache_survives_between_runs() {
    let tmp = TempDir::new().unwrap();
    let catalog = JsonCatalog::new(write_catalog(&tmp));
    let config = SiteConfig::default();
    let cache_dir = tmp.path().join("temp");

    let first = GalleryLoader::new(
        config.clone(),
        ContentModerator::from_config(&config.moderation),
        ModerationCache::load(&cache_dir),
    );
    let loaded = first.load(&catalog).await.unwrap();
    assert_eq!(loaded.cache_stats.hits, 0);
    first.into_cache().save(&cache_dir).unwrap();

    let second = GalleryLoader::new(
        config.clone(),
        ContentModerator::from_config(&config.moderation),
        ModerationCache::load(&cache_dir),
    );
    let reloaded = second.load(&catalog).await.unwrap();
    assert_eq!(reloaded.cache_stats.hits, 3);
    assert_eq!(reloaded.images, {
        // Timestamps differ between runs; compare everything else
        let mut expected = loaded.images.clone();
        for (e, r) in expected.iter_mut().zip(&reloaded.images) {
            e.date_added = r.date_added;
        }
        expected
    });
}
