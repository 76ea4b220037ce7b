//! Roster event types and EventBus
//!
//! Every change to the roster query state is published as a [`RosterEvent`].
//! The service forwards them to browsers over SSE; tests subscribe to count
//! transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::model::SortField;
use crate::query::SortDirection;

/// Roster state change notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RosterEvent {
    /// A load finished and replaced the collection
    ProfilesLoaded {
        /// Records kept after normalization
        count: usize,
        /// Entries dropped as invalid or duplicate
        dropped: usize,
        timestamp: DateTime<Utc>,
    },

    /// A load failed; the message is user-visible
    LoadFailed {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Immediately-visible search text changed (not yet applied)
    SearchTextChanged {
        text: String,
        timestamp: DateTime<Utc>,
    },

    /// Search text settled and now drives filtering
    DebouncedSearchChanged {
        query: String,
        timestamp: DateTime<Utc>,
    },

    /// Sort key and direction replaced together
    SortingChanged {
        field: SortField,
        direction: SortDirection,
        timestamp: DateTime<Utc>,
    },

    /// Current page moved
    PageChanged {
        page: usize,
        total_pages: usize,
        timestamp: DateTime<Utc>,
    },
}

impl RosterEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            RosterEvent::ProfilesLoaded { .. } => "ProfilesLoaded",
            RosterEvent::LoadFailed { .. } => "LoadFailed",
            RosterEvent::SearchTextChanged { .. } => "SearchTextChanged",
            RosterEvent::DebouncedSearchChanged { .. } => "DebouncedSearchChanged",
            RosterEvent::SortingChanged { .. } => "SortingChanged",
            RosterEvent::PageChanged { .. } => "PageChanged",
        }
    }
}

/// Central event distribution bus
///
/// Wraps `tokio::sync::broadcast`: publishing never blocks, slow subscribers
/// see a lag error instead of stalling the producer, and receivers clean up
/// when dropped.
///
/// # Examples
///
/// ```
/// use ybk_common::events::{EventBus, RosterEvent};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(RosterEvent::LoadFailed {
///     message: "Failed to load profiles: offline".to_string(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(RosterEvent::LoadFailed { .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RosterEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` when nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: RosterEvent,
    ) -> Result<usize, broadcast::error::SendError<RosterEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: RosterEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_err() {
        let bus = EventBus::new(4);
        let result = bus.emit(RosterEvent::SearchTextChanged {
            text: "a".to_string(),
            timestamp: Utc::now(),
        });
        assert!(result.is_err());
        assert_eq!(bus.capacity(), 4);
    }

    #[test]
    fn test_subscribers_receive_events() {
        let bus = EventBus::new(4);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let sent = bus
            .emit(RosterEvent::PageChanged {
                page: 2,
                total_pages: 4,
                timestamp: Utc::now(),
            })
            .unwrap();
        assert_eq!(sent, 2);

        for rx in [&mut rx1, &mut rx2] {
            match rx.try_recv().unwrap() {
                RosterEvent::PageChanged { page, total_pages, .. } => {
                    assert_eq!((page, total_pages), (2, 4));
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = RosterEvent::SortingChanged {
            field: SortField::FullName,
            direction: SortDirection::Desc,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SortingChanged");
        assert_eq!(json["field"], "fullName");
        assert_eq!(json["direction"], "desc");
        assert_eq!(event.event_type(), "SortingChanged");
    }
}
