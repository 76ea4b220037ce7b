//! Debounced query session
//!
//! Wraps a [`QueryEngine`] for use from async handlers and owns the single
//! pending debounce task. Each search update cancels the pending task and
//! schedules a new one; the engine's ticket generation check guarantees that
//! a task which wakes up after being superseded does nothing.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{QueryEngine, QuerySnapshot};
use crate::model::DisplayRecord;

/// Default quiet period before search text is applied
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Shared handle to a query engine with debounced search
#[derive(Clone)]
pub struct QuerySession {
    engine: Arc<Mutex<QueryEngine>>,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
    debounce: Duration,
}

impl QuerySession {
    pub fn new(engine: QueryEngine, debounce: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            pending: Arc::new(Mutex::new(None)),
            debounce,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Lock the engine for direct reads or mutations
    pub async fn engine(&self) -> MutexGuard<'_, QueryEngine> {
        self.engine.lock().await
    }

    /// Update the search text; the debounced value follows after the quiet period
    pub async fn set_search_text(&self, text: impl Into<String>) {
        // Held across the engine update so concurrent callers cannot reorder
        // ticket issue and task replacement.
        let mut pending = self.pending.lock().await;
        let ticket = self.engine.lock().await.set_search_text(text);

        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let engine = Arc::clone(&self.engine);
        let delay = self.debounce;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let generation = ticket.generation();
            if engine.lock().await.apply_debounced(ticket) {
                debug!(generation, "Applied debounced search text");
            }
        }));
    }

    /// Clear the search immediately and drop any pending update
    pub async fn clear_search(&self) {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        self.engine.lock().await.clear_search();
    }

    /// Replace the collection after a load
    pub async fn replace_records(&self, records: Vec<DisplayRecord>) {
        self.engine.lock().await.set_records(records);
    }

    /// Owned copy of the current query state and page
    pub async fn snapshot(&self) -> QuerySnapshot {
        self.engine.lock().await.snapshot()
    }
}
