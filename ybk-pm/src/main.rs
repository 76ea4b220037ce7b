//! ybk-pm - Yearbook photo matcher
//!
//! Run after each batch of profile photo uploads:
//!
//! ```text
//! ybk-pm                      # match hosted photos and rewrite the roster
//! ybk-pm update --dry-run --report report.json
//! ybk-pm list                 # show hosted photos and a mapping template
//! ybk-pm apply-mapping --mapping photos.toml
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ybk_common::config::Settings;
use ybk_pm::image_host::{AssetListing, DEFAULT_FOLDER, DEFAULT_MAX_RESULTS};
use ybk_pm::listing::render_listing;
use ybk_pm::roster_file::DEFAULT_ROSTER_PATH;
use ybk_pm::{run_apply_mapping, run_update, CloudinaryClient, MappingOptions, RunOutcome, UpdateOptions};

/// Command-line arguments for ybk-pm
#[derive(Parser, Debug)]
#[command(name = "ybk-pm")]
#[command(about = "Match hosted profile photos to the yearbook roster")]
#[command(version)]
struct Cli {
    /// Roster JSON file to update
    #[arg(long, global = true, env = "YEARBOOK_ROSTER_FILE", default_value = DEFAULT_ROSTER_PATH)]
    roster: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Match hosted photos to roster entries by student id (default)
    Update(UpdateArgs),
    /// List hosted photos and print a manual mapping template
    List(ListArgs),
    /// Apply a manual student id to public id mapping
    ApplyMapping(MappingArgs),
}

#[derive(Args, Debug)]
struct UpdateArgs {
    /// Image host folder to search
    #[arg(long, default_value = DEFAULT_FOLDER)]
    folder: String,

    /// Search every folder instead of --folder
    #[arg(long)]
    all_folders: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: u32,

    /// Compute matches without writing the roster or backup
    #[arg(long)]
    dry_run: bool,

    /// Write the match report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Default for UpdateArgs {
    fn default() -> Self {
        Self {
            folder: DEFAULT_FOLDER.to_string(),
            all_folders: false,
            max_results: DEFAULT_MAX_RESULTS,
            dry_run: false,
            report: None,
        }
    }
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Only list this folder
    #[arg(long)]
    folder: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: u32,
}

#[derive(Args, Debug)]
struct MappingArgs {
    /// TOML file with a [photos] table of student id = public id
    #[arg(long)]
    mapping: PathBuf,

    #[arg(long)]
    dry_run: bool,

    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env();

    init_tracing(settings.app.debug);
    info!("ybk-pm v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command.unwrap_or(Command::Update(UpdateArgs::default())) {
        Command::Update(args) => update(&settings, cli.roster, args).await,
        Command::List(args) => list(&settings, args).await,
        Command::ApplyMapping(args) => apply(&settings, cli.roster, args),
    };

    if let Err(e) = &result {
        error!("❌ {:#}", e);
    }
    result
}

async fn update(settings: &Settings, roster: PathBuf, args: UpdateArgs) -> Result<()> {
    let client = CloudinaryClient::from_settings(settings).context("Invalid configuration")?;

    let options = UpdateOptions {
        roster_path: roster,
        folder: (!args.all_folders).then_some(args.folder),
        max_results: args.max_results,
        dry_run: args.dry_run,
        report_path: args.report,
    };

    let outcome = run_update(&client, &options).await.context("Photo update failed")?;
    print_outcome(&outcome);
    Ok(())
}

async fn list(settings: &Settings, args: ListArgs) -> Result<()> {
    let client = CloudinaryClient::from_settings(settings).context("Invalid configuration")?;
    let assets = client
        .list_assets(args.folder.as_deref(), args.max_results)
        .await
        .context("Listing failed")?;

    print!("{}", render_listing(&assets));
    Ok(())
}

fn apply(settings: &Settings, roster: PathBuf, args: MappingArgs) -> Result<()> {
    let options = MappingOptions {
        roster_path: roster,
        mapping_path: args.mapping,
        dry_run: args.dry_run,
        report_path: args.report,
    };

    let outcome = run_apply_mapping(settings, &options).context("Applying mapping failed")?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    if let Some(backup) = &outcome.backup_path {
        println!("💾 Backup saved to: {}", backup.display());
    }
    outcome.report.print_summary();
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("ybk_pm={0},ybk_common={0}", default_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
