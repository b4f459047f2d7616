//! moodmatch-ai - mood classification and track recommendation
//!
//! Subcommands:
//! - `serve`: HTTP API (default 127.0.0.1:5730)
//! - `analyze`: classify one file and print the display as JSON
//! - `build-catalog`: extract a directory of audio files into the catalog CSV
//! - `train`: fit the mood model from the catalog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moodmatch_ai::catalog::{Catalog, CatalogBuilder, MoodMap};
use moodmatch_ai::classifier::{self, MoodClassifier, TrainOptions};
use moodmatch_ai::config::ServiceConfig;
use moodmatch_ai::features::FeatureExtractor;
use moodmatch_ai::orchestrator::MoodOrchestrator;
use moodmatch_ai::{db, AppState};
use moodmatch_common::config::{LoggingConfig, TomlConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "moodmatch-ai", version)]
#[command(about = "Audio mood classification and track recommendation")]
struct Cli {
    /// Root folder for catalog, model and query log [env: MOODMATCH_ROOT_FOLDER]
    #[arg(long, global = true)]
    root_folder: Option<PathBuf>,

    /// TOML configuration file [env: MOODMATCH_CONFIG]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Classify one audio file and print the result as JSON
    Analyze {
        /// Audio file; omit to see the waiting state
        file: Option<PathBuf>,
    },

    /// Build the catalog from a directory of audio files
    BuildCatalog {
        /// Directory of audio files
        audio_dir: PathBuf,

        /// TOML table mapping file names to mood labels
        #[arg(long)]
        moods: Option<PathBuf>,

        /// Output CSV (defaults to the configured catalog path)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also scan subdirectories
        #[arg(long)]
        recursive: bool,
    },

    /// Train the mood model from the catalog
    Train {
        /// Catalog CSV (defaults to the configured catalog path)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Inverse regularisation strength
        #[arg(long, default_value_t = 1.0)]
        c: f64,

        /// Maximum gradient-descent iterations
        #[arg(long, default_value_t = 1000)]
        max_iter: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging level and file come from the config file
    let toml_config = TomlConfig::load_resolved(cli.config.as_deref())?;
    init_tracing(&toml_config.logging)?;

    let config = ServiceConfig::resolve(cli.root_folder.as_deref(), &toml_config)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(config, port).await,
        Command::Analyze { file } => analyze(config, file).await,
        Command::BuildCatalog {
            audio_dir,
            moods,
            output,
            recursive,
        } => build_catalog(config, audio_dir, moods, output, recursive).await,
        Command::Train {
            catalog,
            c,
            max_iter,
        } => train(config, catalog, c, max_iter).await,
    }
}

/// Stderr logging, plus a plain-text file when configured; `RUST_LOG` overrides the level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "moodmatch_ai={level},moodmatch_common={level},tower_http={level}",
            level = logging.level
        )
        .into()
    });

    let file_layer = match &logging.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

async fn build_orchestrator(
    config: &ServiceConfig,
) -> Result<(MoodOrchestrator, Option<sqlx::SqlitePool>)> {
    let classifier = MoodClassifier::load_dir(&config.model_dir).with_context(|| {
        format!(
            "Failed to load model artifacts from {} (run `moodmatch-ai train` first)",
            config.model_dir.display()
        )
    })?;

    let mut orchestrator = MoodOrchestrator::new(
        FeatureExtractor::new(config.max_duration_seconds),
        classifier,
        config.catalog_path.clone(),
    )
    .with_threshold(config.confidence_threshold)
    .with_limit(config.recommendation_limit);

    let pool = match db::init_query_log(&config.query_log_path).await {
        Ok(pool) => {
            info!("Query log: {}", config.query_log_path.display());
            orchestrator = orchestrator.with_query_log(pool.clone());
            Some(pool)
        }
        Err(e) => {
            warn!("Query log disabled: {}", e);
            None
        }
    };

    Ok((orchestrator, pool))
}

async fn serve(config: ServiceConfig, port: Option<u16>) -> Result<()> {
    info!("Starting moodmatch-ai");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {}", config.catalog_path.display());

    let (orchestrator, pool) = build_orchestrator(&config).await?;
    let app = moodmatch_ai::build_router(AppState::new(orchestrator, pool));

    let addr = SocketAddr::from(([127, 0, 0, 1], port.unwrap_or(config.port)));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn analyze(config: ServiceConfig, file: Option<PathBuf>) -> Result<()> {
    let (orchestrator, _pool) = build_orchestrator(&config).await?;
    let display = orchestrator.process(file.as_deref()).await;
    println!("{}", serde_json::to_string_pretty(&display)?);
    Ok(())
}

async fn build_catalog(
    config: ServiceConfig,
    audio_dir: PathBuf,
    moods: Option<PathBuf>,
    output: Option<PathBuf>,
    recursive: bool,
) -> Result<()> {
    let moods = match moods {
        Some(path) => MoodMap::load(&path)?,
        None => MoodMap::default(),
    };
    let output = output.unwrap_or_else(|| config.catalog_path.clone());
    let builder = CatalogBuilder::new(FeatureExtractor::new(config.max_duration_seconds))
        .recursive(recursive);

    let summary = tokio::task::spawn_blocking(move || builder.build(&audio_dir, &moods, &output))
        .await??;

    info!(
        written = summary.written,
        skipped = summary.skipped.len(),
        "Catalog build complete"
    );
    Ok(())
}

async fn train(
    config: ServiceConfig,
    catalog: Option<PathBuf>,
    c: f64,
    max_iter: usize,
) -> Result<()> {
    let catalog_path = catalog.unwrap_or_else(|| config.catalog_path.clone());
    let catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
    info!(
        rows = catalog.len(),
        moods = ?catalog.moods(),
        "Training mood model"
    );

    let options = TrainOptions {
        c,
        max_iter,
        ..TrainOptions::default()
    };
    let (model, encoder) =
        tokio::task::spawn_blocking(move || classifier::train(&catalog, &options)).await??;

    let classifier = MoodClassifier::from_parts(model, encoder)?;
    classifier.save_dir(&config.model_dir)?;
    info!(
        model_dir = %config.model_dir.display(),
        classes = ?classifier.classes(),
        "Model artifacts saved"
    );
    Ok(())
}
