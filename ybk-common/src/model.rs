//! Roster data model
//!
//! Person records are loaded from a hand-maintained JSON file, so the model is
//! lenient on the way in: unknown keys are kept verbatim in `extra` and
//! survive a load/save cycle in their original order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Canonical key for the photo URL in roster JSON
pub const PHOTO_KEY: &str = "photoUrl";

/// Provenance key written next to a photo URL that came from the image host
pub const PHOTO_INFO_KEY: &str = "photoInfo";

/// Keys older roster files used for the photo, in read priority order
pub const LEGACY_PHOTO_KEYS: [&str; 2] = ["formalphoto", "photo"];

/// One person in the cohort roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    /// Student number, unique within a roster
    pub student_id: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthplace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Every other key of the source object, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Why a raw roster entry could not become a [`PersonRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotAnObject,
    MissingStudentId,
    MissingFullName,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::NotAnObject => "not an object",
            RejectReason::MissingStudentId => "missing studentId",
            RejectReason::MissingFullName => "missing fullName",
        };
        f.write_str(text)
    }
}

impl PersonRecord {
    /// Build a record from an untyped JSON value
    ///
    /// `studentId` and `fullName` must be non-empty strings. The photo is read
    /// from `photoUrl` first, then from the legacy keys; whichever key is used
    /// is consumed, the rest stay in `extra`.
    pub fn from_json(raw: &Value) -> std::result::Result<Self, RejectReason> {
        let object = raw.as_object().ok_or(RejectReason::NotAnObject)?;
        let mut map = object.clone();

        let student_id =
            take_required(&mut map, "studentId").ok_or(RejectReason::MissingStudentId)?;
        let full_name = take_required(&mut map, "fullName").ok_or(RejectReason::MissingFullName)?;

        let nickname = take_optional(&mut map, "nickname");
        let city = take_optional(&mut map, "city");
        let class = take_optional(&mut map, "class");
        let birthplace = take_optional(&mut map, "birthplace");

        let mut photo_url = take_optional(&mut map, PHOTO_KEY);
        for key in LEGACY_PHOTO_KEYS {
            if photo_url.is_none() {
                photo_url = take_optional(&mut map, key);
            }
        }

        Ok(Self {
            student_id,
            full_name,
            nickname,
            city,
            class,
            birthplace,
            photo_url,
            extra: map,
        })
    }

    /// String value of a profile field, if present
    pub fn field(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::FullName => Some(self.full_name.as_str()),
            ProfileField::Nickname => self.nickname.as_deref(),
            ProfileField::StudentId => Some(self.student_id.as_str()),
            ProfileField::City => self.city.as_deref(),
            ProfileField::Class => self.class.as_deref(),
            ProfileField::Birthplace => self.birthplace.as_deref(),
        }
    }
}

/// Remove a required string key; blank strings count as missing
fn take_required(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    let present = matches!(map.get(key), Some(Value::String(s)) if !s.trim().is_empty());
    if !present {
        return None;
    }
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Remove an optional string key; non-string values are left in place
fn take_optional(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    let consume = matches!(map.get(key), Some(Value::String(_)) | Some(Value::Null));
    if !consume {
        return None;
    }
    match map.remove(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// A person record ready for display
///
/// `image_url` is always populated: either the resolved photo URL or the
/// default avatar path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRecord {
    #[serde(flatten)]
    pub person: PersonRecord,
    pub image_url: String,
}

impl DisplayRecord {
    pub fn student_id(&self) -> &str {
        &self.person.student_id
    }

    pub fn full_name(&self) -> &str {
        &self.person.full_name
    }

    pub fn field(&self, field: ProfileField) -> Option<&str> {
        self.person.field(field)
    }
}

/// Profile fields that can be searched and sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    FullName,
    Nickname,
    StudentId,
    City,
    Class,
    Birthplace,
}

impl ProfileField {
    /// Fields consulted by the search filter
    pub const SEARCHABLE: [ProfileField; 6] = [
        ProfileField::FullName,
        ProfileField::Nickname,
        ProfileField::StudentId,
        ProfileField::City,
        ProfileField::Class,
        ProfileField::Birthplace,
    ];

    /// JSON key of this field
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::FullName => "fullName",
            ProfileField::Nickname => "nickname",
            ProfileField::StudentId => "studentId",
            ProfileField::City => "city",
            ProfileField::Class => "class",
            ProfileField::Birthplace => "birthplace",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ProfileField::SEARCHABLE
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown profile field: {}", s)))
    }
}

/// Sort keys are the searchable fields
pub type SortField = ProfileField;

/// An image listed by the external image host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Host-side identifier (public id), e.g. `profile-photos/21120125120002`
    pub asset_id: String,
    /// Direct (secure) delivery URL
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last path segment of `asset_id`, used for matching
    pub file_name_stem: String,
}

impl ImageAsset {
    pub fn new(
        asset_id: impl Into<String>,
        url: impl Into<String>,
        width: u32,
        height: u32,
        format: impl Into<String>,
    ) -> Self {
        let asset_id = asset_id.into();
        let file_name_stem = file_name_stem(&asset_id).to_string();
        Self {
            asset_id,
            url: url.into(),
            width,
            height,
            format: format.into(),
            created_at: None,
            file_name_stem,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Top-level folder of the asset, empty for assets at the root
    pub fn folder(&self) -> &str {
        match self.asset_id.split_once('/') {
            Some((folder, _)) => folder,
            None => "",
        }
    }

    /// Provenance sub-record for a roster entry that uses this asset
    pub fn photo_info(&self) -> PhotoInfo {
        PhotoInfo {
            asset_id: self.asset_id.clone(),
            width: self.width,
            height: self.height,
            format: self.format.clone(),
        }
    }
}

/// Last `/`-separated segment of a public id
pub fn file_name_stem(asset_id: &str) -> &str {
    asset_id.rsplit('/').next().unwrap_or(asset_id)
}

/// Metadata kept about the hosted asset a photo URL was derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoInfo {
    pub asset_id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_reads_required_and_optional_fields() {
        let raw = json!({
            "studentId": "21120125120002",
            "fullName": "Arsa Rafif Parama",
            "nickname": "Arsa",
            "city": "Semarang",
            "instagram": "@arsa"
        });

        let person = PersonRecord::from_json(&raw).unwrap();
        assert_eq!(person.student_id, "21120125120002");
        assert_eq!(person.nickname.as_deref(), Some("Arsa"));
        assert_eq!(person.class, None);
        assert_eq!(person.extra.get("instagram"), Some(&json!("@arsa")));
        assert!(!person.extra.contains_key("studentId"));
    }

    #[test]
    fn test_from_json_rejects_missing_required_fields() {
        assert_eq!(
            PersonRecord::from_json(&json!({"fullName": "No Id"})),
            Err(RejectReason::MissingStudentId)
        );
        assert_eq!(
            PersonRecord::from_json(&json!({"studentId": "1", "fullName": "  "})),
            Err(RejectReason::MissingFullName)
        );
        assert_eq!(
            PersonRecord::from_json(&json!(null)),
            Err(RejectReason::NotAnObject)
        );
        assert_eq!(
            PersonRecord::from_json(&json!({"studentId": 42, "fullName": "Numeric"})),
            Err(RejectReason::MissingStudentId)
        );
    }

    #[test]
    fn test_legacy_photo_keys_are_read_in_priority_order() {
        let raw = json!({
            "studentId": "1",
            "fullName": "A",
            "photo": "https://example.com/b.jpg",
            "formalphoto": "https://example.com/a.jpg"
        });
        let person = PersonRecord::from_json(&raw).unwrap();
        assert_eq!(person.photo_url.as_deref(), Some("https://example.com/a.jpg"));
        // The unused legacy key is kept as unknown data
        assert!(person.extra.contains_key("photo"));
        assert!(!person.extra.contains_key("formalphoto"));
    }

    #[test]
    fn test_canonical_photo_key_wins_over_legacy() {
        let raw = json!({
            "studentId": "1",
            "fullName": "A",
            "formalphoto": "https://example.com/old.jpg",
            "photoUrl": "https://example.com/new.jpg"
        });
        let person = PersonRecord::from_json(&raw).unwrap();
        assert_eq!(person.photo_url.as_deref(), Some("https://example.com/new.jpg"));
    }

    #[test]
    fn test_display_record_serializes_flat_camel_case() {
        let person = PersonRecord::from_json(&json!({
            "studentId": "1",
            "fullName": "A",
            "hobby": "chess"
        }))
        .unwrap();
        let record = DisplayRecord {
            person,
            image_url: "/images/default-avatar.svg".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["studentId"], "1");
        assert_eq!(value["imageUrl"], "/images/default-avatar.svg");
        assert_eq!(value["hobby"], "chess");
        assert!(value.get("nickname").is_none());
    }

    #[test]
    fn test_profile_field_parse() {
        assert_eq!("fullName".parse::<ProfileField>().unwrap(), ProfileField::FullName);
        assert_eq!("class".parse::<ProfileField>().unwrap(), ProfileField::Class);
        assert!("email".parse::<ProfileField>().is_err());
    }

    #[test]
    fn test_image_asset_stem_and_folder() {
        let asset = ImageAsset::new(
            "profile-photos/21120125120002",
            "https://res.cloudinary.com/demo/image/upload/v1/profile-photos/21120125120002.jpg",
            800,
            800,
            "jpg",
        );
        assert_eq!(asset.file_name_stem, "21120125120002");
        assert_eq!(asset.folder(), "profile-photos");

        let root = ImageAsset::new("loose", "https://x/loose.png", 1, 1, "png");
        assert_eq!(root.file_name_stem, "loose");
        assert_eq!(root.folder(), "");
    }
}
