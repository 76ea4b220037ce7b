//! Image URL resolution
//!
//! Profile photos come from three places: a default avatar shipped with the
//! front end, shareable links into Google Drive (which do not render as
//! images and must be rewritten to the direct-view form), and the image host
//! that the photo matcher migrates everything to.

use once_cell::sync::Lazy;
use regex::Regex;

/// Avatar shown when a person has no usable photo
pub const DEFAULT_AVATAR: &str = "/images/default-avatar.svg";

const DRIVE_DIRECT_VIEW: &str = "https://drive.google.com/uc?export=view&id=";

static DRIVE_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://(?:www\.)?drive\.google\.com/").expect("valid regex"));

static DRIVE_FILE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/file/d/([A-Za-z0-9_-]+)").expect("valid regex"));

static DRIVE_ID_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").expect("valid regex"));

/// How a display image URL was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// No photo field, or an empty one
    DefaultAvatar,
    /// Shareable drive link rewritten to its direct-view form
    DriveRewritten,
    /// Drive link without a recognizable file id
    DriveUnresolved,
    /// URL used as given
    PassThrough,
}

/// Resolve the URL a profile card should display
pub fn resolve_image_url(photo: Option<&str>) -> (String, ImageSource) {
    let photo = match photo.map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => return (DEFAULT_AVATAR.to_string(), ImageSource::DefaultAvatar),
    };

    if is_drive_link(photo) {
        return match drive_file_id(photo) {
            Some(id) => (format!("{}{}", DRIVE_DIRECT_VIEW, id), ImageSource::DriveRewritten),
            None => (DEFAULT_AVATAR.to_string(), ImageSource::DriveUnresolved),
        };
    }

    (photo.to_string(), ImageSource::PassThrough)
}

/// Whether a URL points at Google Drive
pub fn is_drive_link(url: &str) -> bool {
    DRIVE_HOST.is_match(url)
}

/// File identifier token of a Google Drive link
pub fn drive_file_id(url: &str) -> Option<&str> {
    DRIVE_FILE_PATH
        .captures(url)
        .or_else(|| DRIVE_ID_PARAM.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Delivery transformation applied by the image host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    pub width: u32,
    pub height: u32,
    pub crop: String,
    pub quality: String,
    pub format: String,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            crop: "fill".to_string(),
            quality: "auto".to_string(),
            format: "auto".to_string(),
        }
    }
}

impl Transform {
    /// Transformation segment, e.g. `w_400,h_400,c_fill,q_auto,f_auto`
    pub fn to_segment(&self) -> String {
        format!(
            "w_{},h_{},c_{},q_{},f_{}",
            self.width, self.height, self.crop, self.quality, self.format
        )
    }
}

/// Delivery URL of a hosted image
///
/// Falls back to the default avatar when the account or the public id is
/// unknown.
pub fn cloudinary_delivery_url(
    cloud_name: Option<&str>,
    public_id: &str,
    transform: &Transform,
) -> String {
    let cloud_name = match cloud_name {
        Some(name) if !name.is_empty() => name,
        _ => {
            tracing::warn!("Image host cloud name not configured, using default avatar");
            return DEFAULT_AVATAR.to_string();
        }
    };
    if public_id.is_empty() {
        return DEFAULT_AVATAR.to_string();
    }
    format!(
        "https://res.cloudinary.com/{}/image/upload/{}/{}",
        cloud_name,
        transform.to_segment(),
        public_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_photo_uses_default_avatar() {
        assert_eq!(
            resolve_image_url(None),
            (DEFAULT_AVATAR.to_string(), ImageSource::DefaultAvatar)
        );
        assert_eq!(resolve_image_url(Some("  ")).1, ImageSource::DefaultAvatar);
    }

    #[test]
    fn test_drive_share_link_is_rewritten() {
        let (url, source) = resolve_image_url(Some(
            "https://drive.google.com/file/d/1AbC_d-E2/view?usp=sharing",
        ));
        assert_eq!(source, ImageSource::DriveRewritten);
        assert_eq!(url, "https://drive.google.com/uc?export=view&id=1AbC_d-E2");
    }

    #[test]
    fn test_drive_open_link_is_rewritten() {
        let (url, _) = resolve_image_url(Some("https://drive.google.com/open?id=XYZ123"));
        assert_eq!(url, "https://drive.google.com/uc?export=view&id=XYZ123");
    }

    #[test]
    fn test_drive_link_without_token_falls_back() {
        let (url, source) = resolve_image_url(Some("https://drive.google.com/drive/my-drive"));
        assert_eq!(url, DEFAULT_AVATAR);
        assert_eq!(source, ImageSource::DriveUnresolved);
    }

    #[test]
    fn test_other_urls_pass_through() {
        let photo = "https://res.cloudinary.com/demo/image/upload/v1/a.jpg";
        assert_eq!(
            resolve_image_url(Some(photo)),
            (photo.to_string(), ImageSource::PassThrough)
        );
    }

    #[test]
    fn test_cloudinary_delivery_url() {
        let url = cloudinary_delivery_url(
            Some("dr5hcyo7i"),
            "profile-photos/21120125130058",
            &Transform::default(),
        );
        assert_eq!(
            url,
            "https://res.cloudinary.com/dr5hcyo7i/image/upload/w_400,h_400,c_fill,q_auto,f_auto/profile-photos/21120125130058"
        );
    }

    #[test]
    fn test_cloudinary_delivery_url_without_account() {
        assert_eq!(
            cloudinary_delivery_url(None, "x", &Transform::default()),
            DEFAULT_AVATAR
        );
        assert_eq!(
            cloudinary_delivery_url(Some("demo"), "", &Transform::default()),
            DEFAULT_AVATAR
        );
    }
}
