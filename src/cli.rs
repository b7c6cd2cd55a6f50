//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// BeerSnap - scan a beer, see if you'll like it
#[derive(Parser)]
#[command(name = "beersnap")]
#[command(about = "Taste profiles from beer labels, offline", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (overrides BEERSNAP_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read a label photo and build its profile
    Analyze {
        /// Photo of a label or menu
        image: PathBuf,

        /// Do not add the result to the history
        #[arg(long)]
        no_save: bool,

        /// Include the full-size image in the output
        #[arg(long)]
        with_image: bool,
    },

    /// Build a profile from text (stdin when neither --text nor --file is given)
    Infer {
        /// Label text
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// File containing label text
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Add the result to the history
        #[arg(long)]
        save: bool,
    },

    /// List recent captures, newest first
    History {
        /// Maximum entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one profile with a personal decision
    Show {
        /// Profile id
        id: String,
    },

    /// Add a profile to favorites, or remove it
    Favorite {
        /// Profile id
        id: String,
    },

    /// List favorites
    Favorites,

    /// Show or update preferences
    Prefs {
        /// Minimum ABV focus, 0 to 12 in steps of 0.5
        #[arg(long)]
        min_abv: Option<f64>,

        /// Whether hazy beers are welcome
        #[arg(long)]
        likes_hazy: Option<bool>,

        /// Favourite style family, e.g. "Hoppy & bitter" (repeatable, replaces the list)
        #[arg(long = "family")]
        families: Vec<String>,

        /// Favourite style, e.g. "Stout" (repeatable, replaces the list)
        #[arg(long = "style")]
        styles: Vec<String>,
    },

    /// Delete the capture history
    ClearHistory,

    /// Check configuration and OCR engine availability
    Doctor,
}
