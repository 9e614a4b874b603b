//! Canvas controller
//!
//! Mediates between raw canvas gestures and the [`NodeSequenceStore`]. It
//! owns the zoom level and reports every accepted change to an
//! [`EventSink`].

use std::sync::Arc;

use crate::config::{EditorConfig, InsertPolicy};
use crate::events::{EditorEvent, EventSink, HistoryDirection, NullEventSink};
use crate::store::NodeSequenceStore;
use crate::types::{NodeId, NodeKind, NodeSequence};
use crate::zoom::Zoom;

/// Translates gestures into store mutations and owns zoom
pub struct CanvasController {
    store: NodeSequenceStore,
    zoom: Zoom,
    insert_policy: InsertPolicy,
    events: Arc<dyn EventSink>,
}

impl CanvasController {
    /// Create a controller over a freshly seeded store
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_store(NodeSequenceStore::new(config), config, Arc::new(NullEventSink))
    }

    /// Create a controller over an existing store
    pub fn with_store(
        store: NodeSequenceStore,
        config: &EditorConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            zoom: Zoom::new(config.default_zoom),
            insert_policy: config.insert_policy,
            events,
        }
    }

    /// Replace the event sink
    pub fn set_event_sink(&mut self, events: Arc<dyn EventSink>) {
        self.events = events;
    }

    pub fn store(&self) -> &NodeSequenceStore {
        &self.store
    }

    /// Hand the store back, e.g. when the session closes
    pub fn into_store(self) -> NodeSequenceStore {
        self.store
    }

    pub fn sequence(&self) -> &NodeSequence {
        self.store.current_sequence()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom.value()
    }

    pub fn insert_policy(&self) -> InsertPolicy {
        self.insert_policy
    }

    // =========================================================================
    // Zoom
    // =========================================================================

    pub fn zoom_in(&mut self) -> f64 {
        self.apply_zoom(self.zoom.stepped_in())
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.apply_zoom(self.zoom.stepped_out())
    }

    /// Absolute zoom, clamped. Non-finite values are ignored.
    pub fn set_zoom(&mut self, value: f64) -> f64 {
        if !value.is_finite() {
            log::debug!("Ignored non-finite zoom {}", value);
            return self.zoom();
        }
        self.apply_zoom(Zoom::new(value))
    }

    pub fn reset_zoom(&mut self) -> f64 {
        self.apply_zoom(Zoom::default())
    }

    fn apply_zoom(&mut self, zoom: Zoom) -> f64 {
        if zoom != self.zoom {
            self.zoom = zoom;
            self.emit(EditorEvent::ZoomChanged { zoom: zoom.value() });
        }
        self.zoom()
    }

    // =========================================================================
    // Node commands
    // =========================================================================

    /// Append a node before the end sentinel
    pub fn add_node(&mut self, kind: NodeKind, label: &str, color: &str) -> Option<NodeId> {
        let id = self.store.add_node(kind, label, color)?;
        self.emit_added(&id, kind);
        Some(id)
    }

    /// Resolve a "+" on the connector below `anchor`
    ///
    /// The anchor must be a node that has a connector beneath it, i.e. any
    /// node except the end sentinel. Under [`InsertPolicy::BeforeEnd`] the
    /// new node still lands just before the end sentinel.
    pub fn request_insert_after(
        &mut self,
        anchor: &str,
        kind: NodeKind,
        label: &str,
        color: &str,
    ) -> Option<NodeId> {
        let has_connector = self
            .sequence()
            .position(anchor)
            .is_some_and(|index| index + 1 < self.sequence().len());
        if !has_connector {
            log::debug!("Ignored insert below '{}': no connector there", anchor);
            return None;
        }

        let id = match self.insert_policy {
            InsertPolicy::BeforeEnd => self.store.add_node(kind, label, color),
            InsertPolicy::AfterAnchor => self.store.insert_after(anchor, kind, label, color),
        }?;
        self.emit_added(&id, kind);
        Some(id)
    }

    /// Delete a node. Sentinel ids are ignored.
    pub fn request_delete(&mut self, node_id: &str) -> bool {
        if self
            .sequence()
            .find(node_id)
            .is_some_and(|node| node.is_sentinel())
        {
            log::debug!("Ignored delete of sentinel '{}'", node_id);
            return false;
        }
        self.remove_node(node_id)
    }

    /// Remove a node via the store
    pub fn remove_node(&mut self, node_id: &str) -> bool {
        let removed = self.store.remove_node(node_id);
        if removed {
            self.emit(EditorEvent::NodeRemoved {
                node_id: node_id.to_string(),
            });
        }
        removed
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.store.undo();
        if moved {
            self.emit_history(HistoryDirection::Undo);
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.store.redo();
        if moved {
            self.emit_history(HistoryDirection::Redo);
        }
        moved
    }

    fn emit_added(&self, id: &str, kind: NodeKind) {
        let index = self.sequence().position(id).unwrap_or_default();
        self.emit(EditorEvent::NodeAdded {
            node_id: id.to_string(),
            kind,
            index,
        });
    }

    fn emit_history(&self, direction: HistoryDirection) {
        self.emit(EditorEvent::HistoryMoved {
            direction,
            index: self.store.history_index().unwrap_or_default(),
            can_undo: self.store.can_undo(),
            can_redo: self.store.can_redo(),
        });
    }

    fn emit(&self, event: EditorEvent) {
        if let Err(e) = self.events.send(event) {
            log::warn!("Failed to deliver editor event: {}", e);
        }
    }
}
