//! Match report
//!
//! Per-person outcome plus totals describing where every roster photo now
//! points. Printed to the console after a run and optionally written as JSON.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use ybk_common::image_url::is_drive_link;
use ybk_common::model::{LEGACY_PHOTO_KEYS, PHOTO_KEY};

use crate::error::{BatchError, Result};

/// What happened to one roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MatchOutcome {
    #[serde(rename_all = "camelCase")]
    Matched { asset_id: String },
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonOutcome {
    /// None when the entry has no string `studentId`
    pub student_id: Option<String>,
    pub full_name: Option<String>,
    #[serde(flatten)]
    pub outcome: MatchOutcome,
}

/// Where roster photos point after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoTotals {
    pub people: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Photo present and not a Drive link
    pub hosted: usize,
    pub still_drive: usize,
    pub no_photo: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub outcomes: Vec<PersonOutcome>,
    pub totals: PhotoTotals,
}

impl MatchReport {
    /// Build a report from per-person outcomes and the updated roster
    pub fn new(outcomes: Vec<PersonOutcome>, updated: &[Value]) -> Self {
        let matched = outcomes
            .iter()
            .filter(|o| matches!(o.outcome, MatchOutcome::Matched { .. }))
            .count();

        let mut totals = PhotoTotals {
            people: updated.len(),
            matched,
            unmatched: outcomes.len() - matched,
            ..PhotoTotals::default()
        };

        for person in updated {
            match photo_of(person) {
                None => totals.no_photo += 1,
                Some(url) if is_drive_link(url) => totals.still_drive += 1,
                Some(_) => totals.hosted += 1,
            }
        }

        Self { outcomes, totals }
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &PersonOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == MatchOutcome::Unmatched)
    }

    /// Console summary
    pub fn print_summary(&self) {
        let t = &self.totals;
        println!();
        println!("📊 SUMMARY:");
        println!("Total people: {}", t.people);
        println!("Matched this run: {}/{}", t.matched, t.people);
        println!("With hosted photos: {}", t.hosted);
        println!("Still Google Drive: {}", t.still_drive);
        println!("No photos: {}", t.no_photo);

        let mut unmatched = self.unmatched().peekable();
        if unmatched.peek().is_some() {
            println!();
            println!("⚠️  People without a matched photo:");
            for person in unmatched {
                println!(
                    "   - {} ({})",
                    person.full_name.as_deref().unwrap_or("<no name>"),
                    person.student_id.as_deref().unwrap_or("<no student id>")
                );
            }
        }
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| BatchError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        std::fs::write(path, json).map_err(|e| BatchError::io(path, e))
    }
}

/// Photo URL of a raw roster entry, canonical key first, blank counts as none
fn photo_of(person: &Value) -> Option<&str> {
    std::iter::once(PHOTO_KEY)
        .chain(LEGACY_PHOTO_KEYS)
        .find_map(|key| person.get(key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|url| !url.is_empty())
}
