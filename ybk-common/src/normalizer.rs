//! Normalizer: raw roster JSON → display-ready records
//!
//! The roster is maintained by hand, so partial success is the normal case.
//! Entries that are not objects or lack `studentId`/`fullName` are dropped,
//! as are repeated student ids (first occurrence wins). Nothing here fails.

use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::image_url::{resolve_image_url, ImageSource};
use crate::model::{DisplayRecord, PersonRecord};

/// Counters describing one normalization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub accepted: usize,
    /// Invalid entries (not an object, missing required field)
    pub dropped: usize,
    /// Valid entries whose student id was already seen
    pub duplicates: usize,
    /// Drive links rewritten to direct-view URLs
    pub rewritten: usize,
}

/// Normalize raw roster entries, keeping input order
pub fn normalize(raw: &[Value]) -> Vec<DisplayRecord> {
    normalize_with_summary(raw).0
}

/// Normalize raw roster entries and report what was kept and dropped
pub fn normalize_with_summary(raw: &[Value]) -> (Vec<DisplayRecord>, NormalizeSummary) {
    let mut summary = NormalizeSummary::default();
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(raw.len());

    for (index, value) in raw.iter().enumerate() {
        let person = match PersonRecord::from_json(value) {
            Ok(person) => person,
            Err(reason) => {
                debug!(index, %reason, "Dropping roster entry");
                summary.dropped += 1;
                continue;
            }
        };

        if !seen.insert(person.student_id.clone()) {
            warn!(
                index,
                student_id = %person.student_id,
                "Dropping roster entry with duplicate studentId"
            );
            summary.duplicates += 1;
            continue;
        }

        let (image_url, source) = resolve_image_url(person.photo_url.as_deref());
        match source {
            ImageSource::DriveRewritten => {
                debug!(student_id = %person.student_id, url = %image_url, "Rewrote drive link");
                summary.rewritten += 1;
            }
            ImageSource::DriveUnresolved => {
                debug!(
                    student_id = %person.student_id,
                    "Drive link has no file id, using default avatar"
                );
            }
            ImageSource::DefaultAvatar | ImageSource::PassThrough => {}
        }

        records.push(DisplayRecord { person, image_url });
        summary.accepted += 1;
    }

    info!(
        accepted = summary.accepted,
        dropped = summary.dropped,
        duplicates = summary.duplicates,
        rewritten = summary.rewritten,
        "Normalized roster"
    );

    (records, summary)
}
