//! Roster file on disk
//!
//! Reads the roster JSON array and writes an updated one. Every write is
//! preceded by a backup of the roster exactly as it was read, next to the
//! roster as `people-backup.json`. If the backup cannot be written the roster
//! is left alone.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{BatchError, Result};

/// File name of the backup written next to the roster
pub const BACKUP_FILE_NAME: &str = "people-backup.json";

/// Default roster location relative to the site root
pub const DEFAULT_ROSTER_PATH: &str = "public/data/people.json";

/// Roster as read from disk: the exact bytes plus the parsed entries
#[derive(Debug, Clone)]
pub struct RosterContents {
    raw: Vec<u8>,
    pub people: Vec<Value>,
}

impl RosterContents {
    /// File contents exactly as read
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

#[derive(Debug, Clone)]
pub struct RosterFile {
    path: PathBuf,
}

impl RosterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling backup path
    pub fn backup_path(&self) -> PathBuf {
        self.path.with_file_name(BACKUP_FILE_NAME)
    }

    /// Read the roster; a missing file or a non-array payload is fatal
    pub fn read(&self) -> Result<RosterContents> {
        info!("📖 Reading roster from {}", self.path.display());

        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BatchError::RosterNotFound(self.path.clone()));
            }
            Err(e) => return Err(BatchError::io(&self.path, e)),
        };

        let value: Value =
            serde_json::from_slice(&raw).map_err(|e| BatchError::RosterMalformed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        match value {
            Value::Array(people) => {
                info!("Found {} people in roster", people.len());
                Ok(RosterContents { raw, people })
            }
            _ => Err(BatchError::RosterMalformed {
                path: self.path.clone(),
                reason: "expected an array".to_string(),
            }),
        }
    }

    /// Back up `original` byte for byte, then replace the roster with `updated`
    ///
    /// The new roster is pretty-printed and swapped in via a temporary
    /// sibling and a rename. Returns the backup path.
    pub fn write_with_backup(&self, original: &RosterContents, updated: &[Value]) -> Result<PathBuf> {
        let backup_path = self.backup_path();
        std::fs::write(&backup_path, original.raw()).map_err(|e| BatchError::io(&backup_path, e))?;
        info!("💾 Backup saved to {}", backup_path.display());

        let staging = self.path.with_extension("json.tmp");
        write_pretty(&staging, updated)?;
        std::fs::rename(&staging, &self.path).map_err(|e| BatchError::io(&self.path, e))?;
        info!("✓ Updated roster saved to {}", self.path.display());

        Ok(backup_path)
    }
}

fn write_pretty(path: &Path, people: &[Value]) -> Result<()> {
    let json = serde_json::to_string_pretty(people).map_err(|e| BatchError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    std::fs::write(path, json).map_err(|e| BatchError::io(path, e))
}
