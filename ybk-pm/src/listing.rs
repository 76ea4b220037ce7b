//! `list` command output
//!
//! Shows what the image host holds and prints a starting point for a manual
//! mapping file.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt::Write;
use ybk_common::ImageAsset;

/// Cohort student numbers: `21120125` followed by six digits
static STUDENT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"21120125\d{6}").expect("valid student number pattern"));

/// Student number embedded in a file name stem
pub fn student_number(stem: &str) -> Option<&str> {
    STUDENT_NUMBER.find(stem).map(|m| m.as_str())
}

/// Asset count per top-level folder, in order of first appearance
pub fn folder_summary(assets: &[ImageAsset]) -> Vec<(String, usize)> {
    let mut folders: Vec<(String, usize)> = Vec::new();
    for asset in assets {
        let folder = match asset.folder() {
            "" => "(root)",
            folder => folder,
        };
        match folders.iter_mut().find(|(name, _)| name == folder) {
            Some((_, count)) => *count += 1,
            None => folders.push((folder.to_string(), 1)),
        }
    }
    folders
}

/// Manual mapping template in the `apply-mapping` TOML format
///
/// Assets whose names carry a student number become entries; the rest are
/// commented out for hand editing. Only the first asset per student number
/// becomes an entry, later ones are commented out so the table keys stay
/// unique.
pub fn mapping_template(assets: &[ImageAsset]) -> String {
    let mut out = String::from("[photos]\n");
    let mut seen = HashSet::new();
    for asset in assets {
        let line = match student_number(&asset.file_name_stem) {
            Some(number) if seen.insert(number) => {
                format!("\"{}\" = \"{}\"", number, asset.asset_id)
            }
            Some(number) => format!("# \"{}\" = \"{}\"", number, asset.asset_id),
            None => format!("# \"{}\" = \"{}\"", asset.file_name_stem, asset.asset_id),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Full listing: folders, each asset, then the mapping template
pub fn render_listing(assets: &[ImageAsset]) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "📊 Total photos found: {}\n", assets.len());

    let _ = writeln!(out, "📁 Folders:");
    for (folder, count) in folder_summary(assets) {
        let _ = writeln!(out, "   📂 {}/ ({} files)", folder, count);
    }

    let _ = writeln!(out, "\n📸 Photos:");
    for (index, asset) in assets.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, asset.asset_id);
        let _ = writeln!(out, "   📏 {}x{} | {}", asset.width, asset.height, asset.format);
        let _ = writeln!(out, "   🔗 {}", asset.url);
        if let Some(created_at) = asset.created_at {
            let _ = writeln!(out, "   📅 {}", created_at.format("%Y-%m-%d"));
        }
        out.push('\n');
    }

    let _ = writeln!(out, "📝 Manual mapping template (save as TOML for apply-mapping):\n");
    out.push_str(&mapping_template(assets));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn assets() -> Vec<ImageAsset> {
        vec![
            ImageAsset::new("profile-photos/21120125120002", "https://x/a.jpg", 400, 500, "jpg")
                .with_created_at(Utc.with_ymd_and_hms(2025, 8, 20, 9, 0, 0).unwrap()),
            ImageAsset::new("profile-photos/ayu_formal", "https://x/b.jpg", 400, 500, "png"),
            ImageAsset::new("class/orientation", "https://x/c.jpg", 1600, 900, "jpg"),
            ImageAsset::new("loose", "https://x/d.jpg", 10, 10, "gif"),
        ]
    }

    #[test]
    fn test_student_number() {
        assert_eq!(student_number("IMG_21120125120002_v2"), Some("21120125120002"));
        assert_eq!(student_number("2112012512"), None);
    }

    #[test]
    fn test_folder_summary() {
        assert_eq!(
            folder_summary(&assets()),
            vec![
                ("profile-photos".to_string(), 2),
                ("class".to_string(), 1),
                ("(root)".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_mapping_template() {
        let template = mapping_template(&assets());
        assert!(template.starts_with("[photos]\n"));
        assert!(template.contains("\"21120125120002\" = \"profile-photos/21120125120002\"\n"));
        assert!(template.contains("# \"ayu_formal\" = \"profile-photos/ayu_formal\"\n"));
    }

    #[test]
    fn test_template_parses_as_mapping() {
        let mapping = crate::mapping::ManualMapping::parse(&mapping_template(&assets())).unwrap();
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_template_comments_out_repeated_numbers() {
        let assets = vec![
            ImageAsset::new("profile-photos/21120125120002", "https://x/a.jpg", 400, 500, "jpg"),
            ImageAsset::new("profile-photos/21120125120002_v2", "https://x/b.jpg", 400, 500, "jpg"),
            ImageAsset::new("profile-photos/21120125120003", "https://x/c.jpg", 400, 500, "jpg"),
        ];
        let template = mapping_template(&assets);

        assert!(template.contains("\n\"21120125120002\" = \"profile-photos/21120125120002\"\n"));
        assert!(template.contains("# \"21120125120002\" = \"profile-photos/21120125120002_v2\"\n"));

        let mapping = crate::mapping::ManualMapping::parse(&template).unwrap();
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_render_listing() {
        let listing = render_listing(&assets());
        assert!(listing.contains("Total photos found: 4"));
        assert!(listing.contains("📂 profile-photos/ (2 files)"));
        assert!(listing.contains("📏 1600x900 | jpg"));
        assert!(listing.contains("📅 2025-08-20"));
    }
}
