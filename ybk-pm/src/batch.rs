//! Batch runs
//!
//! `run_update` and `run_apply_mapping` share one discipline: everything that
//! can fail before the write step (settings, roster read, image listing,
//! mapping parse) happens first, and nothing is written unless all of it
//! succeeded.

use std::path::PathBuf;
use tracing::info;
use ybk_common::config::{Setting, Settings};

use crate::error::{BatchError, Result};
use crate::image_host::{AssetListing, DEFAULT_FOLDER, DEFAULT_MAX_RESULTS};
use crate::mapping::{apply_mapping, ManualMapping};
use crate::matcher::match_photos;
use crate::report::MatchReport;
use crate::roster_file::{RosterContents, RosterFile};

/// Options for `update`
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub roster_path: PathBuf,
    /// Image host folder; `None` lists every asset
    pub folder: Option<String>,
    pub max_results: u32,
    /// Compute and report without writing the roster or the backup
    pub dry_run: bool,
    pub report_path: Option<PathBuf>,
}

impl UpdateOptions {
    pub fn new(roster_path: impl Into<PathBuf>) -> Self {
        Self {
            roster_path: roster_path.into(),
            folder: Some(DEFAULT_FOLDER.to_string()),
            max_results: DEFAULT_MAX_RESULTS,
            dry_run: false,
            report_path: None,
        }
    }
}

/// What a run did
#[derive(Debug)]
pub struct RunOutcome {
    pub report: MatchReport,
    /// None on a dry run
    pub backup_path: Option<PathBuf>,
}

/// Match hosted photos to the roster and rewrite it
pub async fn run_update(listing: &dyn AssetListing, options: &UpdateOptions) -> Result<RunOutcome> {
    info!("🚀 Starting photo update");

    let roster = RosterFile::new(&options.roster_path);
    let contents = roster.read()?;

    let assets = listing
        .list_assets(options.folder.as_deref(), options.max_results)
        .await?;

    let (updated, report) = match_photos(&assets, &contents.people);
    finish(&roster, &contents, &updated, report, options.dry_run, options.report_path.as_ref())
}

/// Options for `apply-mapping`
#[derive(Debug, Clone)]
pub struct MappingOptions {
    pub roster_path: PathBuf,
    pub mapping_path: PathBuf,
    pub dry_run: bool,
    pub report_path: Option<PathBuf>,
}

/// Apply a manual student id to public id table and rewrite the roster
pub fn run_apply_mapping(settings: &Settings, options: &MappingOptions) -> Result<RunOutcome> {
    info!("🚀 Applying manual photo mapping");

    settings.validate(&[Setting::CloudName])?;
    let cloud_name = settings
        .cloud
        .cloud_name
        .as_deref()
        .ok_or_else(|| BatchError::Mapping("cloud name not configured".to_string()))?;

    let mapping = ManualMapping::from_file(&options.mapping_path)?;
    info!("Loaded {} mapping entries", mapping.len());

    let roster = RosterFile::new(&options.roster_path);
    let contents = roster.read()?;

    let (updated, report) = apply_mapping(&mapping, cloud_name, &contents.people);
    finish(&roster, &contents, &updated, report, options.dry_run, options.report_path.as_ref())
}

fn finish(
    roster: &RosterFile,
    original: &RosterContents,
    updated: &[serde_json::Value],
    report: MatchReport,
    dry_run: bool,
    report_path: Option<&PathBuf>,
) -> Result<RunOutcome> {
    let backup_path = if dry_run {
        info!("Dry run: roster and backup not written");
        None
    } else {
        Some(roster.write_with_backup(original, updated)?)
    };

    if let Some(path) = report_path {
        report.write_json(path)?;
        info!("Report written to {}", path.display());
    }

    Ok(RunOutcome {
        report,
        backup_path,
    })
}
