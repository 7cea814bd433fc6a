use clap::{Parser, Subcommand, ValueEnum};
use maka_gal::cache::ModerationCache;
use maka_gal::catalog::{CatalogSource, EmbeddedCatalog, JsonCatalog};
use maka_gal::config::{self, SiteConfig};
use maka_gal::load::{GalleryLoader, LoadError, LoadOutput};
use maka_gal::moderation::ContentModerator;
use maka_gal::{generate, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that moderate images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the moderation cache and moderate every image again
    #[arg(long)]
    no_cache: bool,
}

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "maka-gal")]
#[command(about = "Moderated fashion gallery builder")]
#[command(long_about = "\
Moderated fashion gallery builder

Reads a catalog of images, derives categories, tags and colors from the
filenames, checks every image against the moderation policy, and writes a
browsable static gallery with filters, pagination, a lightbox and details
pages.

Catalog format (JSON array; the built-in collection is used when omitted):

  [
    { \"image\": \"Gallery Pictures\\\\Black_Hoodie_For_Kids.png\",
      \"badge\": \"Superdry Kids\",
      \"message\": \"Stay cozy and stylish.\" }
  ]

Filename detection:
  Categories:  kids/niño/child → Kids, adult/men/women → Adults,
               hoodie → Hoodies, jacket/chaqueta → Jackets, shirt → T-Shirts
  Tags:        color and brand names found in the filename
  Title:       detected garment type, else the configured default

Run 'maka-gal gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Catalog JSON file (built-in collection when omitted)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (moderation cache)
    #[arg(long, default_value = ".maka-gal-temp", global = true)]
    temp_dir: PathBuf,

    /// Directory image paths resolve against; present images are copied,
    /// missing ones render a placeholder
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Set log level
    #[arg(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load and moderate the catalog, then write the site
    Build(CacheArgs),
    /// Load and moderate the catalog and print the report, without writing a site
    Check(CacheArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site_config = config::load_config(&cli.config)?;
    let source: Box<dyn CatalogSource> = match &cli.catalog {
        Some(path) => Box::new(JsonCatalog::new(path)),
        None => Box::new(EmbeddedCatalog),
    };
    let source_label = source.describe();

    match cli.command {
        Command::Build(cache_args) => {
            println!("==> Loading {}", source_label);
            let loaded = match load_catalog(
                &site_config,
                source.as_ref(),
                &cli.temp_dir,
                cache_args.no_cache,
            )
            .await
            {
                Ok(loaded) => loaded,
                Err(e) => {
                    // Leave the reload page behind for whoever serves the output
                    if let Some(load_error) = e.downcast_ref::<LoadError>() {
                        generate::write_load_failure(load_error, &site_config, &cli.output)?;
                        println!(
                            "==> Load failed, wrote reload page \u{2192} {}",
                            cli.output.join("index.html").display()
                        );
                    }
                    return Err(e);
                }
            };
            output::print_load_output(&loaded, &source_label);

            println!("==> Generating HTML \u{2192} {}", cli.output.display());
            let report = generate::generate(
                &loaded.images,
                &site_config,
                &cli.output,
                cli.assets.as_deref(),
            )?;
            output::print_generate_output(&report, &cli.output);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check(cache_args) => {
            println!("==> Checking {}", source_label);
            let loaded = load_catalog(
                &site_config,
                source.as_ref(),
                &cli.temp_dir,
                cache_args.no_cache,
            )
            .await?;
            output::print_load_output(&loaded, &source_label);
            match loaded.flagged_count() {
                0 => println!("==> All images approved"),
                n => println!("==> {} flagged for review", n),
            }
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Configures logging based on --log-level. Logs go to stderr so stdout
/// stays a clean report.
fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load and moderate the catalog, reusing and refreshing the verdict cache
/// in `temp_dir` unless `no_cache` is set.
async fn load_catalog(
    site_config: &SiteConfig,
    source: &dyn CatalogSource,
    temp_dir: &Path,
    no_cache: bool,
) -> Result<LoadOutput, Box<dyn std::error::Error>> {
    let cache = if no_cache {
        ModerationCache::empty()
    } else {
        ModerationCache::load(temp_dir)
    };
    let moderator = ContentModerator::from_config(&site_config.moderation);
    let loader = GalleryLoader::new(site_config.clone(), moderator, cache);
    let loaded = loader.load(source).await?;
    if !no_cache {
        loader.into_cache().save(temp_dir)?;
    }
    Ok(loaded)
}
