//! BeerSnap CLI
//!
//! Usage:
//!   beersnap analyze label.jpg      Read a label and build its profile
//!   beersnap infer --text "..."     Build a profile from text
//!   beersnap history                Recent captures
//!   beersnap prefs --min-abv 5      Update preferences

mod cli;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use beer_snap::config::AppConfig;
use beer_snap::errors::AppError;
use beer_snap::observability;
use beer_snap::ocr::ProgressReporter;
use beer_snap::pipeline::LocalAnalyzer;
use beer_snap::preferences::assess;
use beer_snap::profile::{BeerProfile, StyleFamily};
use beer_snap::store::ProfileStore;
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use cli::{Cli, Commands};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_label_text(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read text file {}", path.display()));
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Cannot read label text from stdin")?;
    Ok(buffer)
}

fn find_profile(store: &ProfileStore, id: &str) -> Result<BeerProfile> {
    store
        .find(id)?
        .ok_or_else(|| anyhow::anyhow!("No profile with id {}", id))
}

async fn cmd_analyze(
    config: &AppConfig,
    store: &ProfileStore,
    image: PathBuf,
    no_save: bool,
    with_image: bool,
) -> Result<()> {
    let analyzer = LocalAnalyzer::from_config(config);
    let progress = ProgressReporter::new(|p| eprint!("\rReading label... {:>3.0}%", p * 100.0));

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = analyzer.analyze(&image, &progress, &cancel).await;
    ctrl_c.abort();
    eprintln!();

    let analysis = match result {
        Ok(analysis) => analysis,
        Err(_) if cancel.is_cancelled() => return Err(anyhow::anyhow!("Analysis cancelled")),
        Err(AppError::Ocr(msg)) => {
            return Err(anyhow::anyhow!("Analysis failed. Try a clearer photo. {}", msg));
        }
        Err(e) => return Err(e.into()),
    };

    if !no_save {
        store.save_to_history(&analysis.profile)?;
    }

    let decision = assess(&analysis.profile, &store.preferences()?);
    let profile = if with_image {
        analysis.profile
    } else {
        analysis.profile.stripped_for_storage()
    };

    print_json(&json!({
        "profile": profile,
        "decision": decision,
        "ocrConfidence": analysis.ocr.confidence,
    }))
}

fn cmd_infer(
    store: &ProfileStore,
    text: Option<String>,
    file: Option<PathBuf>,
    save: bool,
) -> Result<()> {
    let text = read_label_text(text, file)?;
    let profile = beer_snap::infer_profile(&text);
    if save {
        store.save_to_history(&profile)?;
    }
    let decision = assess(&profile, &store.preferences()?);
    print_json(&json!({ "profile": profile, "decision": decision }))
}

fn cmd_history(store: &ProfileStore, limit: Option<usize>) -> Result<()> {
    let mut history = store.history()?;
    if let Some(limit) = limit {
        history.truncate(limit);
    }
    let rows: Vec<_> = history
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "name": p.name,
                "style": p.style,
                "abv": p.abv,
                "capturedAt": p.captured_at,
            })
        })
        .collect();
    print_json(&rows)
}

fn cmd_show(store: &ProfileStore, id: &str) -> Result<()> {
    let profile = find_profile(store, id)?;
    let decision = assess(&profile, &store.preferences()?);
    let favorite = store.is_favorite(id)?;
    print_json(&json!({ "profile": profile, "decision": decision, "favorite": favorite }))
}

fn cmd_favorite(store: &ProfileStore, id: &str) -> Result<()> {
    let profile = find_profile(store, id)?;
    let added = store.toggle_favorite(&profile)?;
    print_json(&json!({ "id": id, "favorite": added }))
}

fn cmd_prefs(
    store: &ProfileStore,
    min_abv: Option<f64>,
    likes_hazy: Option<bool>,
    families: Vec<String>,
    styles: Vec<String>,
) -> Result<()> {
    let mut prefs = store.preferences()?;
    let changed = min_abv.is_some() || likes_hazy.is_some() || !families.is_empty() || !styles.is_empty();

    if let Some(min_abv) = min_abv {
        prefs.min_abv = min_abv;
    }
    if let Some(likes_hazy) = likes_hazy {
        prefs.likes_hazy = likes_hazy;
    }
    if !families.is_empty() {
        prefs.fav_families = families
            .iter()
            .map(|label| {
                StyleFamily::from_label(label)
                    .ok_or_else(|| anyhow::anyhow!("Unknown style family: {}", label))
            })
            .collect::<Result<Vec<_>>>()?;
    }
    if !styles.is_empty() {
        prefs.fav_styles = styles;
    }

    if changed {
        store.save_preferences(&prefs)?;
        info!("Preferences saved");
    }
    print_json(&prefs)
}

fn cmd_doctor(config: &AppConfig, store: &ProfileStore) -> Result<()> {
    let ocr = observability::check_ocr_health(&config.ocr);
    let history = store.history()?;
    print_json(&json!({
        "config": config.summary(),
        "ocrEngine": match &ocr {
            Ok(()) => "ok".to_string(),
            Err(e) => e.to_string(),
        },
        "historyEntries": history.len(),
    }))?;
    ocr
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.store.data_dir = dir;
    }
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }

    observability::init_tracing_with_config(&config.observability)?;
    config.validate().map_err(|e| {
        beer_snap::errors::error_logging::log_config_error(&e, "AppConfig", "startup_validation");
        anyhow::anyhow!("Configuration validation failed: {}", e)
    })?;
    info!("{}", config.summary());

    let store = ProfileStore::open(config.store.clone())?;

    match cli.command {
        Commands::Analyze {
            image,
            no_save,
            with_image,
        } => cmd_analyze(&config, &store, image, no_save, with_image).await,
        Commands::Infer { text, file, save } => cmd_infer(&store, text, file, save),
        Commands::History { limit } => cmd_history(&store, limit),
        Commands::Show { id } => cmd_show(&store, &id),
        Commands::Favorite { id } => cmd_favorite(&store, &id),
        Commands::Favorites => print_json(&store.favorites()?),
        Commands::Prefs {
            min_abv,
            likes_hazy,
            families,
            styles,
        } => cmd_prefs(&store, min_abv, likes_hazy, families, styles),
        Commands::ClearHistory => {
            store.clear_history()?;
            Ok(())
        }
        Commands::Doctor => cmd_doctor(&config, &store),
    }
}
