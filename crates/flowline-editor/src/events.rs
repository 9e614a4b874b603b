//! Event types for editor state changes
//!
//! Events are sent from the controller to whoever renders the canvas so it
//! knows to redraw. Rejected gestures produce no event.

use serde::{Deserialize, Serialize};

use crate::types::NodeKind;

/// Trait for sending editor events
///
/// This abstracts over the transport mechanism (UI channel, mpsc, etc.)
/// so the controller can be hosted anywhere.
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be sent (e.g., channel closed)
    fn send(&self, event: EditorEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Which way history moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryDirection {
    Undo,
    Redo,
}

/// Events emitted after accepted editor changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// A node was inserted
    #[serde(rename_all = "camelCase")]
    NodeAdded {
        node_id: String,
        kind: NodeKind,
        index: usize,
    },

    /// A node was removed
    #[serde(rename_all = "camelCase")]
    NodeRemoved { node_id: String },

    /// Undo or redo moved the history pointer
    #[serde(rename_all = "camelCase")]
    HistoryMoved {
        direction: HistoryDirection,
        index: usize,
        can_undo: bool,
        can_redo: bool,
    },

    /// Zoom level changed
    #[serde(rename_all = "camelCase")]
    ZoomChanged { zoom: f64 },
}

/// A no-op event sink that discards all events
///
/// Useful for testing or when events aren't needed.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: EditorEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: std::sync::Mutex<Vec<EditorEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        let mut events = self.events.lock().map_err(|_| EventError {
            message: "Event buffer poisoned".to_string(),
        })?;
        events.push(event);
        Ok(())
    }
}
