//! Image host listing
//!
//! The matcher only needs "list the images in a folder, newest first".
//! `CloudinaryClient` answers that through the Cloudinary search API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};
use ybk_common::config::Settings;
use ybk_common::ImageAsset;

use crate::error::{BatchError, Result};

const CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";
const USER_AGENT: &str = concat!("ybk-pm/", env!("CARGO_PKG_VERSION"));

/// Default folder holding profile photos
pub const DEFAULT_FOLDER: &str = "profile-photos";

/// Largest page the search API returns
pub const DEFAULT_MAX_RESULTS: u32 = 500;

/// Source of hosted images
#[async_trait]
pub trait AssetListing: Send + Sync {
    /// Assets under `folder` (all assets when `None`), newest first
    async fn list_assets(&self, folder: Option<&str>, max_results: u32)
        -> Result<Vec<ImageAsset>>;
}

/// Search request body
#[derive(Debug, Serialize)]
struct SearchRequest {
    expression: String,
    sort_by: Vec<serde_json::Value>,
    max_results: u32,
}

impl SearchRequest {
    fn new(folder: Option<&str>, max_results: u32) -> Self {
        let expression = match folder {
            Some(folder) if !folder.is_empty() => format!("folder:{}", folder),
            _ => String::new(),
        };
        Self {
            expression,
            sort_by: vec![json!({"created_at": "desc"})],
            max_results,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    public_id: String,
    secure_url: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    format: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<Resource> for ImageAsset {
    fn from(resource: Resource) -> Self {
        let asset = ImageAsset::new(
            resource.public_id,
            resource.secure_url,
            resource.width,
            resource.height,
            resource.format,
        );
        match resource.created_at {
            Some(created_at) => asset.with_created_at(created_at),
            None => asset,
        }
    }
}

/// Cloudinary admin API client
pub struct CloudinaryClient {
    http_client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryClient {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BatchError::Listing(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: CLOUDINARY_API_BASE.to_string(),
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        })
    }

    /// Build a client from validated settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate(&ybk_common::config::BATCH_REQUIRED)?;
        let cloud = &settings.cloud;
        match (&cloud.cloud_name, &cloud.api_key, &cloud.api_secret) {
            (Some(name), Some(key), Some(secret)) => Self::new(name, key, secret),
            // validate() above guarantees all three
            _ => Err(BatchError::Listing("incomplete image host credentials".to_string())),
        }
    }

    /// Point the client at another API root (e.g. a local stand-in)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn search_url(&self) -> String {
        format!("{}/{}/resources/search", self.base_url, self.cloud_name)
    }
}

#[async_trait]
impl AssetListing for CloudinaryClient {
    async fn list_assets(
        &self,
        folder: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<ImageAsset>> {
        let request = SearchRequest::new(folder, max_results);
        debug!(expression = %request.expression, max_results, "Searching image host");

        let response = self
            .http_client
            .post(self.search_url())
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&request)
            .send()
            .await
            .map_err(|e| BatchError::Listing(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BatchError::Listing(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| BatchError::Listing(format!("Unexpected search response: {}", e)))?;

        let assets: Vec<ImageAsset> = parsed.resources.into_iter().map(ImageAsset::from).collect();
        info!("✓ Found {} photos", assets.len());
        Ok(assets)
    }
}
