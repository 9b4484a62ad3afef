//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod annotate;
mod check;
mod process;
mod serve;
mod structure;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use archivum::config::Config;
use archivum::ocr::RecognitionMode;

/// Output format for annotated text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Text with `<mark class="ner-...">` markup
    #[default]
    Html,
    /// Full result as pretty-printed JSON
    Json,
}

#[derive(Parser)]
#[command(name = "archivum")]
#[command(about = "Line segmentation, recognition and entity annotation for archival scans")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate text with entity and date markup
    Annotate {
        /// Text to annotate (reads stdin when neither TEXT nor --file is given)
        text: Option<String>,
        /// Read text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Convert pre-reform spelling before annotating
        #[arg(short, long)]
        translate: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "html")]
        format: OutputFormat,
    },

    /// Segment an image into lines and recognize each line
    Structure {
        /// Image file
        image: PathBuf,
        /// Vertical tolerance for grouping boxes into lines (pixels)
        #[arg(long)]
        tolerance: Option<f32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recognize an image and annotate the resulting text
    Process {
        /// Image file
        image: PathBuf,
        /// Printed (ocr) or handwritten (htr) text
        #[arg(short, long, value_enum, default_value = "htr")]
        mode: RecognitionMode,
        /// Convert pre-reform spelling before annotating
        #[arg(short, long)]
        translate: bool,
        /// Output format
        #[arg(long, value_enum, default_value = "html")]
        format: OutputFormat,
    },

    /// Report which OCR and entity backends are usable
    Check,

    /// Start the HTTP API server
    Serve {
        /// Address to bind: PORT, HOST or HOST:PORT (defaults from config)
        bind: Option<String>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load_with_path(cli.config.as_deref())
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    match cli.command {
        Commands::Annotate {
            text,
            file,
            translate,
            format,
        } => annotate::cmd_annotate(&config, text, file, translate, format).await,
        Commands::Structure {
            image,
            tolerance,
            json,
        } => structure::cmd_structure(&config, &image, tolerance, json).await,
        Commands::Process {
            image,
            mode,
            translate,
            format,
        } => process::cmd_process(&config, &image, mode, translate, format).await,
        Commands::Check => check::cmd_check(&config).await,
        Commands::Serve { bind } => serve::cmd_serve(&config, bind.as_deref()).await,
    }
}
