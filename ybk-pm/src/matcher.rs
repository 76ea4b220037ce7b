//! Photo matcher
//!
//! Pairs roster entries with hosted images by comparing the image file name
//! with the student id. The heuristic is loose: the first asset, in listing
//! order, whose lowercase stem equals, contains, or is contained by the
//! lowercase student id wins. A short stem such as `2` therefore matches many
//! students; listing order decides which one gets it. Keep stems equal to the
//! full student id to stay out of trouble.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use ybk_common::model::{LEGACY_PHOTO_KEYS, PHOTO_INFO_KEY, PHOTO_KEY};
use ybk_common::{ImageAsset, PhotoInfo};

use crate::report::{MatchOutcome, MatchReport, PersonOutcome};

/// Whether an asset file name stem identifies `student_id`
pub fn stem_matches(stem: &str, student_id: &str) -> bool {
    let stem = stem.to_lowercase();
    let student_id = student_id.to_lowercase();
    if stem.is_empty() || student_id.is_empty() {
        return false;
    }
    stem == student_id || stem.contains(&student_id) || student_id.contains(&stem)
}

/// First asset in listing order matching `student_id`
pub fn find_asset<'a>(assets: &'a [ImageAsset], student_id: &str) -> Option<&'a ImageAsset> {
    assets
        .iter()
        .find(|asset| stem_matches(&asset.file_name_stem, student_id))
}

/// Match every roster entry against `assets`
///
/// Returns the updated roster (same length and order) and the report.
/// Unmatched entries are passed through unchanged.
pub fn match_photos(assets: &[ImageAsset], people: &[Value]) -> (Vec<Value>, MatchReport) {
    info!("🔄 Matching {} photos against {} people", assets.len(), people.len());

    let mut updated = Vec::with_capacity(people.len());
    let mut outcomes = Vec::with_capacity(people.len());

    for person in people {
        let student_id = person.get("studentId").and_then(Value::as_str);
        let full_name = person.get("fullName").and_then(Value::as_str);

        let found = student_id.and_then(|id| find_asset(assets, id));
        let outcome = match found {
            Some(asset) => {
                info!(
                    "✓ Found photo for {} ({}): {}",
                    full_name.unwrap_or_default(),
                    student_id.unwrap_or_default(),
                    asset.file_name_stem
                );
                updated.push(with_photo(person, &asset.url, asset.photo_info()));
                MatchOutcome::Matched {
                    asset_id: asset.asset_id.clone(),
                }
            }
            None => {
                match student_id {
                    Some(id) => warn!(
                        "No photo found for {} ({})",
                        full_name.unwrap_or_default(),
                        id
                    ),
                    None => debug!("Skipping roster entry without studentId"),
                }
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

    let report = MatchReport::new(outcomes, &updated);
    info!(
        "✓ Matched {}/{} photos",
        report.totals.matched, report.totals.people
    );
    (updated, report)
}

/// Copy of `person` pointing at `url`, with provenance
///
/// Legacy photo keys are removed so the canonical key is the only one left.
/// Non-object values are returned unchanged.
pub fn with_photo(person: &Value, url: &str, info: PhotoInfo) -> Value {
    let Some(object) = person.as_object() else {
        return person.clone();
    };

    let mut object: Map<String, Value> = object.clone();
    for key in LEGACY_PHOTO_KEYS {
        object.remove(key);
    }
    object.insert(PHOTO_KEY.to_string(), Value::String(url.to_string()));
    object.insert(
        PHOTO_INFO_KEY.to_string(),
        serde_json::to_value(info).unwrap_or(Value::Null),
    );
    Value::Object(object)
}
