//! Manual photo mapping
//!
//! For photos whose file names do not carry the student id, a hand-written
//! TOML table maps student ids to public ids:
//!
//! ```toml
//! [photos]
//! "21120125130058" = "profile-photos/21120125130058"
//! "21120125140124" = "profile-photos/ayu_formal"
//! ```
//!
//! Mapped people get a transformed delivery URL rather than the raw upload.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{info, warn};
use ybk_common::image_url::{cloudinary_delivery_url, Transform};
use ybk_common::PhotoInfo;

use crate::error::{BatchError, Result};
use crate::matcher::with_photo;
use crate::report::{MatchOutcome, MatchReport, PersonOutcome};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ManualMapping {
    /// Student id to public id
    #[serde(default)]
    pub photos: BTreeMap<String, String>,
}

impl ManualMapping {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BatchError::io(path, e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mapping: ManualMapping =
            toml::from_str(content).map_err(|e| BatchError::Mapping(e.to_string()))?;

        if let Some((student_id, _)) = mapping
            .photos
            .iter()
            .find(|(_, public_id)| public_id.trim().is_empty())
        {
            return Err(BatchError::Mapping(format!(
                "empty public id for {}",
                student_id
            )));
        }
        Ok(mapping)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

/// Point every mapped person at the delivery URL of their public id
///
/// People not in the mapping pass through unchanged.
pub fn apply_mapping(
    mapping: &ManualMapping,
    cloud_name: &str,
    people: &[Value],
) -> (Vec<Value>, MatchReport) {
    let transform = Transform::default();
    let mut used = HashSet::new();
    let mut updated = Vec::with_capacity(people.len());
    let mut outcomes = Vec::with_capacity(people.len());

    for person in people {
        let student_id = person.get("studentId").and_then(Value::as_str);
        let full_name = person.get("fullName").and_then(Value::as_str);

        let public_id = student_id.and_then(|id| mapping.photos.get(id));
        let outcome = match public_id {
            Some(public_id) => {
                let url = cloudinary_delivery_url(Some(cloud_name), public_id, &transform);
                let info = PhotoInfo {
                    asset_id: public_id.clone(),
                    width: transform.width,
                    height: transform.height,
                    format: transform.format.clone(),
                };
                info!(
                    "✓ Adding photo for {} ({})",
                    full_name.unwrap_or_default(),
                    student_id.unwrap_or_default()
                );
                updated.push(with_photo(person, &url, info));
                if let Some(id) = student_id {
                    used.insert(id);
                }
                MatchOutcome::Matched {
                    asset_id: public_id.clone(),
                }
            }
            None => {
                updated.push(person.clone());
                MatchOutcome::Unmatched
            }
        };

        outcomes.push(PersonOutcome {
            student_id: student_id.map(str::to_string),
            full_name: full_name.map(str::to_string),
            outcome,
        });
    }

    for student_id in mapping.photos.keys() {
        if !used.contains(student_id.as_str()) {
            warn!("Mapping entry {} matches nobody in the roster", student_id);
        }
    }

    let report = MatchReport::new(outcomes, &updated);
    (updated, report)
}
