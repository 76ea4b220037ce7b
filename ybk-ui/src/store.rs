//! Roster load state
//!
//! Holds the data source, the query session it feeds, and the user-visible
//! load status. A failed load keeps whatever collection was loaded before and
//! stays failed until the next explicit load.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use ybk_common::events::{EventBus, RosterEvent};
use ybk_common::normalizer::normalize_with_summary;
use ybk_common::QuerySession;

use crate::error::LoadError;
use crate::source::RosterSource;

/// Load status shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LoadStatus {
    /// No load attempted yet
    Idle,
    Loading,
    Ready { count: usize },
    Failed { message: String },
}

/// Roster source, query session and load status
pub struct RosterStore {
    source: Arc<dyn RosterSource>,
    session: QuerySession,
    status: RwLock<LoadStatus>,
    events: EventBus,
}

impl RosterStore {
    pub fn new(source: Arc<dyn RosterSource>, session: QuerySession, events: EventBus) -> Self {
        Self {
            source,
            session,
            status: RwLock::new(LoadStatus::Idle),
            events,
        }
    }

    pub fn session(&self) -> &QuerySession {
        &self.session
    }

    pub fn source_location(&self) -> &str {
        self.source.location()
    }

    pub async fn status(&self) -> LoadStatus {
        self.status.read().await.clone()
    }

    /// Fetch, normalize and install the roster
    ///
    /// Returns the number of records kept. On failure the status carries the
    /// user-visible message and the previous collection stays in place.
    pub async fn load(&self) -> Result<usize, LoadError> {
        *self.status.write().await = LoadStatus::Loading;
        info!(source = %self.source.location(), "Loading profiles");

        match self.source.fetch().await {
            Ok(raw) => {
                let (records, summary) = normalize_with_summary(&raw);
                let count = records.len();
                self.session.replace_records(records).await;
                *self.status.write().await = LoadStatus::Ready { count };

                info!(count, "✓ Profiles loaded");
                self.events.emit_lossy(RosterEvent::ProfilesLoaded {
                    count,
                    dropped: summary.dropped + summary.duplicates,
                    timestamp: chrono::Utc::now(),
                });
                Ok(count)
            }
            Err(e) => {
                let message = format!("Failed to load profiles: {}", e);
                error!("{}", message);
                *self.status.write().await = LoadStatus::Failed {
                    message: message.clone(),
                };
                self.events.emit_lossy(RosterEvent::LoadFailed {
                    message,
                    timestamp: chrono::Utc::now(),
                });
                Err(e)
            }
        }
    }
}
