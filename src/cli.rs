//! # ragie-import CLI interface
//!
//! Command parsing, flag validation and the async [`run`] entrypoint. Everything with
//! policy in it lives in `ragie-import-core`; this module only resolves the effective
//! configuration (flags over the YAML defaults file over built-in defaults), builds the
//! [`RagieClient`] and hands a source reader to the importer.
//!
//! Configuration is validated before the API key is required or the source is opened,
//! so flag mistakes are reported without touching the environment or the filesystem.
use crate::client::RagieClient;
use crate::load_config::{load_config, FileDefaults};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ragie_import_core::config::{ConflictPolicy, ImportConfig};
use ragie_import_core::mode::{ModeOptions, ProcessingMode, VideoMode};
use ragie_import_core::reconcile::{clear_documents, Importer};
use ragie_import_core::sources::{open_source, SourceKind};
use std::path::PathBuf;

/// Seconds to pause after each processed item when neither a flag nor the config file sets it.
pub const DEFAULT_DELAY_SECS: f64 = 2.0;

/// CLI for ragie-import: publish content exports to Ragie as idempotent documents.
#[derive(Debug, Parser)]
#[clap(
    name = "ragie-import",
    version,
    about = "Import YouTube, WordPress, readme.io and file content into Ragie"
)]
pub struct Cli {
    #[clap(flatten)]
    pub global: GlobalArgs,
    #[clap(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Debug, Default, Clone, Args)]
pub struct GlobalArgs {
    /// Print what would happen without making changes
    #[clap(long, global = true)]
    pub dry_run: bool,
    /// Delay between imports in seconds [default: 2.0]
    #[clap(long, global = true)]
    pub delay: Option<f64>,
    /// Optional partition to use for operations
    #[clap(long, global = true)]
    pub partition: Option<String>,
    /// Path to a YAML file with import defaults
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import documents from a source file or directory
    Import(ImportArgs),
    /// Delete all documents, or only those in --partition
    Clear,
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Import(_) => "import",
            Commands::Clear => "clear",
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// Source type: youtube, wordpress, readmeio, files or zip
    pub kind: SourceKind,
    /// Path to the export file, archive or directory
    pub source: PathBuf,
    /// Processing mode for file uploads: fast, hi_res or all
    #[clap(long)]
    pub mode: Option<ProcessingMode>,
    /// Static-content processing mode, sent verbatim
    #[clap(long)]
    pub static_mode: Option<String>,
    /// Enable audio processing for file uploads
    #[clap(long)]
    pub audio: bool,
    /// Video processing: audio_only, video_only or audio_video
    #[clap(long)]
    pub video: Option<VideoMode>,
    /// Upload even when a document with the same external ID exists
    #[clap(long)]
    pub force: bool,
    /// Delete existing documents with the same external ID before uploading
    #[clap(long)]
    pub replace: bool,
}

fn resolve_partition(global: &GlobalArgs, defaults: &FileDefaults) -> Option<String> {
    global
        .partition
        .clone()
        .or_else(|| defaults.partition.clone())
        .filter(|p| !p.is_empty())
}

/// Merge flags, file defaults and built-in defaults into the import configuration.
pub fn import_config(
    global: &GlobalArgs,
    args: &ImportArgs,
    defaults: &FileDefaults,
) -> Result<ImportConfig> {
    let conflict = ConflictPolicy::from_flags(args.force, args.replace)?;
    let delay_secs = global.delay.or(defaults.delay).unwrap_or(DEFAULT_DELAY_SECS);
    let delay = ImportConfig::delay_from_secs(delay_secs)?;

    Ok(ImportConfig {
        dry_run: global.dry_run,
        delay,
        partition: resolve_partition(global, defaults),
        mode: ModeOptions {
            mode: args.mode.or(defaults.mode),
            static_mode: args.static_mode.clone().or_else(|| defaults.static_mode.clone()),
            audio: args.audio || defaults.audio.unwrap_or(false),
            video: args.video.or(defaults.video),
        },
        conflict,
    })
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!(command = cli.command.name(), "CLI command started");

    let defaults = match &cli.global.config {
        Some(path) => load_config(path)?,
        None => FileDefaults::default(),
    };

    match cli.command {
        Commands::Import(args) => {
            let config = import_config(&cli.global, &args, &defaults)?;
            config.trace_loaded();

            let client = RagieClient::new_from_env().context("Failed to construct Ragie client")?;
            let items = open_source(args.kind, &args.source).with_context(|| {
                format!(
                    "Failed to open {} source {}",
                    args.kind,
                    args.source.display()
                )
            })?;

            println!("Running {} import...", args.kind);
            let importer = Importer::new(&client, &config);
            let report = importer.import_all(items).await;
            tracing::info!(command = "import", ?report, "Import complete");
            println!(
                "Import complete: {} created, {} dry-run, {} skipped, {} failed, {} unreadable",
                report.created, report.dry_run, report.skipped, report.failed, report.unreadable
            );
            Ok(())
        }
        Commands::Clear => {
            let partition = resolve_partition(&cli.global, &defaults);
            let client = RagieClient::new_from_env().context("Failed to construct Ragie client")?;

            println!("Running clear...");
            let report = clear_documents(&client, partition.as_deref(), cli.global.dry_run)
                .await
                .map_err(|e| anyhow::anyhow!("failed to list documents: {e}"))?;
            tracing::info!(command = "clear", ?report, "Clear complete");
            Ok(())
        }
    }
}
