//! Roster data sources
//!
//! The roster is a static JSON array of person objects, served over HTTP in
//! production and read from disk in development. A source only fetches and
//! checks the payload shape; validation of individual entries belongs to the
//! normalizer.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::LoadError;

/// Default timeout for roster HTTP requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the roster comes from
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Human-readable location for logs
    fn location(&self) -> &str;

    /// Fetch the raw roster entries
    async fn fetch(&self) -> Result<Vec<Value>, LoadError>;
}

/// Roster served over HTTP
pub struct HttpRosterSource {
    http_client: Client,
    url: String,
}

impl HttpRosterSource {
    pub fn new(url: impl Into<String>) -> Result<Self, LoadError> {
        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| LoadError::Fetch(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RosterSource for HttpRosterSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<Value>, LoadError> {
        debug!(url = %self.url, "Fetching roster");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LoadError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Fetch(format!("HTTP error! status: {}", status.as_u16())));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LoadError::MalformedPayload(format!("response is not JSON ({})", e)))?;

        into_entries(body)
    }
}

/// Roster read from a local JSON file
pub struct FileRosterSource {
    path: PathBuf,
    display: String,
}

impl FileRosterSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display = path.display().to_string();
        Self { path, display }
    }
}

#[async_trait]
impl RosterSource for FileRosterSource {
    fn location(&self) -> &str {
        &self.display
    }

    async fn fetch(&self) -> Result<Vec<Value>, LoadError> {
        debug!(path = %self.display, "Reading roster file");

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| LoadError::Fetch(format!("{}: {}", self.display, e)))?;

        let body: Value = serde_json::from_str(&content)
            .map_err(|e| LoadError::MalformedPayload(format!("file is not JSON ({})", e)))?;

        into_entries(body)
    }
}

/// Pick a source for `location`: `http(s)://` URLs are fetched, anything else is a path
pub fn source_from_location(location: &str) -> Result<Arc<dyn RosterSource>, LoadError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Arc::new(HttpRosterSource::new(location)?))
    } else {
        Ok(Arc::new(FileRosterSource::new(location)))
    }
}

fn into_entries(body: Value) -> Result<Vec<Value>, LoadError> {
    match body {
        Value::Array(entries) => Ok(entries),
        _ => Err(LoadError::MalformedPayload("expected an array".to_string())),
    }
}
