//! Node sequence store
//!
//! Owns the live node chain and its bounded undo/redo history. Every
//! accepted mutation is a total transition from one valid chain to another:
//! a mutation is first applied to a copy, its snapshot is recorded, and only
//! then does the copy become the live chain. Anything that would break the
//! sentinel invariant is rejected as a no-op.

use crate::config::EditorConfig;
use crate::error::Result;
use crate::ids::{NodeIdSource, TimestampIdSource};
use crate::types::{NodeId, NodeKind, NodeSequence, SequenceNode, WorkflowPayload};
use crate::undo::UndoStack;

/// Canonical node chain plus history
pub struct NodeSequenceStore {
    sequence: NodeSequence,
    history: UndoStack,
    ids: Box<dyn NodeIdSource>,
}

impl NodeSequenceStore {
    /// Create a store seeded with `[start, end]`
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_id_source(config, Box::new(TimestampIdSource::new()))
    }

    /// Create a seeded store with a custom id source
    pub fn with_id_source(config: &EditorConfig, ids: Box<dyn NodeIdSource>) -> Self {
        // The seeded chain is always valid, so the initial snapshot can only
        // fail on compression errors, which leave history empty.
        Self::from_sequence(NodeSequence::seeded(), config, ids)
    }

    /// Hydrate a store from a persisted payload
    ///
    /// The payload must describe a valid chain. The hydrated chain becomes
    /// the first history snapshot.
    pub fn from_payload(
        payload: &WorkflowPayload,
        config: &EditorConfig,
        ids: Box<dyn NodeIdSource>,
    ) -> Result<Self> {
        let sequence = payload.to_sequence()?;
        Ok(Self::from_sequence(sequence, config, ids))
    }

    fn from_sequence(
        sequence: NodeSequence,
        config: &EditorConfig,
        mut ids: Box<dyn NodeIdSource>,
    ) -> Self {
        for node in sequence.iter() {
            ids.observe(&node.id);
        }
        let mut history = UndoStack::with_level(config.history_capacity, config.compression_level);
        if let Err(e) = history.push(&sequence) {
            log::warn!("Failed to record initial history snapshot: {}", e);
        }
        Self {
            sequence,
            history,
            ids,
        }
    }

    /// The live node chain
    pub fn current_sequence(&self) -> &NodeSequence {
        &self.sequence
    }

    /// Serialize the live chain for persistence
    pub fn to_payload(&self) -> WorkflowPayload {
        WorkflowPayload::from_sequence(&self.sequence)
    }

    /// Insert a node immediately before the end sentinel
    ///
    /// Returns the new node's id, or None if the chain has no valid
    /// start/end pair, the kind is a sentinel kind, or the label is blank.
    pub fn add_node(&mut self, kind: NodeKind, label: &str, color: &str) -> Option<NodeId> {
        let Some((_, end)) = self.sequence.anchors() else {
            log::debug!("Rejected add_node({}): no start/end pair", kind);
            return None;
        };
        self.insert_at(end, kind, label, color)
    }

    /// Insert a node directly after `anchor`
    ///
    /// The anchor must exist and must lie before the end sentinel.
    pub fn insert_after(
        &mut self,
        anchor: &str,
        kind: NodeKind,
        label: &str,
        color: &str,
    ) -> Option<NodeId> {
        let Some((start, end)) = self.sequence.anchors() else {
            log::debug!("Rejected insert_after({}): no start/end pair", anchor);
            return None;
        };
        match self.sequence.position(anchor) {
            Some(index) if index >= start && index < end => {
                self.insert_at(index + 1, kind, label, color)
            }
            _ => {
                log::debug!("Rejected insert_after: '{}' is not a valid anchor", anchor);
                None
            }
        }
    }

    fn insert_at(
        &mut self,
        index: usize,
        kind: NodeKind,
        label: &str,
        color: &str,
    ) -> Option<NodeId> {
        if kind.is_sentinel() {
            log::debug!("Rejected insert of sentinel kind '{}'", kind);
            return None;
        }
        if label.trim().is_empty() {
            log::debug!("Rejected insert of '{}' with blank label", kind);
            return None;
        }

        let mut id = self.ids.next_id();
        while self.sequence.contains(&id) {
            id = self.ids.next_id();
        }

        let mut next = self.sequence.clone();
        next.insert(index, SequenceNode::new(id.clone(), kind, label, color));
        self.commit(next).then_some(id)
    }

    /// Remove a non-sentinel node
    ///
    /// Returns false (and changes nothing) for sentinels and unknown ids.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let Some(index) = self.sequence.position(id) else {
            log::debug!("Rejected remove_node('{}'): not found", id);
            return false;
        };
        if self.sequence.nodes()[index].is_sentinel() {
            log::debug!("Rejected remove_node('{}'): sentinel", id);
            return false;
        }

        let mut next = self.sequence.clone();
        next.remove(index);
        self.commit(next)
    }

    /// Record a snapshot of `next` and make it live
    fn commit(&mut self, next: NodeSequence) -> bool {
        match self.history.encode(&next) {
            Ok(snapshot) => {
                self.history.push_encoded(snapshot);
                self.sequence = next;
                true
            }
            Err(e) => {
                log::error!("Failed to snapshot node sequence, edit rejected: {}", e);
                false
            }
        }
    }

    /// Step back one snapshot. Returns false at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(Ok(sequence)) => {
                self.sequence = sequence;
                log::debug!("Undo to history index {:?}", self.history.index());
                true
            }
            Some(Err(e)) => {
                log::error!("Failed to restore history snapshot: {}", e);
                false
            }
            None => false,
        }
    }

    /// Step forward one snapshot. Returns false at the newest snapshot.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(Ok(sequence)) => {
                self.sequence = sequence;
                log::debug!("Redo to history index {:?}", self.history.index());
                true
            }
            Some(Err(e)) => {
                log::error!("Failed to restore history snapshot: {}", e);
                false
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of snapshots held
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Pointer into history, or None when history is empty
    pub fn history_index(&self) -> Option<usize> {
        self.history.index()
    }

    /// Compressed bytes held by history
    pub fn history_size(&self) -> usize {
        self.history.compressed_size()
    }
}

impl std::fmt::Debug for NodeSequenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeSequenceStore")
            .field("sequence", &self.sequence)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdSource;
    use crate::types::DEFAULT_NODE_COLOR;

    fn store() -> NodeSequenceStore {
        NodeSequenceStore::with_id_source(
            &EditorConfig::default(),
            Box::new(SequentialIdSource::default()),
        )
    }

    fn kinds(store: &NodeSequenceStore) -> Vec<NodeKind> {
        store.current_sequence().kinds()
    }

    #[test]
    fn test_seeded_store() {
        let store = store();
        assert_eq!(kinds(&store), vec![NodeKind::Start, NodeKind::End]);
        assert_eq!(store.history_len(), 1);
        assert_eq!(store.history_index(), Some(0));
        assert!(!store.can_undo());
        assert!(!store.can_redo());
    }

    #[test]
    fn test_add_inserts_before_end() {
        let mut store = store();
        let a = store.add_node(NodeKind::Api, "Call A", DEFAULT_NODE_COLOR).unwrap();
        let b = store.add_node(NodeKind::Email, "Send B", DEFAULT_NODE_COLOR).unwrap();

        assert_ne!(a, b);
        assert_eq!(
            kinds(&store),
            vec![NodeKind::Start, NodeKind::Api, NodeKind::Email, NodeKind::End]
        );
        assert_eq!(store.history_len(), 3);
        assert_eq!(store.history_index(), Some(2));
    }

    #[test]
    fn test_add_rejects_sentinel_kind_and_blank_label() {
        let mut store = store();
        assert!(store.add_node(NodeKind::Start, "Start", DEFAULT_NODE_COLOR).is_none());
        assert!(store.add_node(NodeKind::End, "End", DEFAULT_NODE_COLOR).is_none());
        assert!(store.add_node(NodeKind::Api, "   ", DEFAULT_NODE_COLOR).is_none());
        assert_eq!(store.history_len(), 1);
    }

    #[test]
    fn test_remove_node() {
        let mut store = store();
        let a = store.add_node(NodeKind::Api, "Call A", DEFAULT_NODE_COLOR).unwrap();

        assert!(store.remove_node(&a));
        assert_eq!(kinds(&store), vec![NodeKind::Start, NodeKind::End]);
        assert_eq!(store.history_len(), 3);

        // Already gone
        assert!(!store.remove_node(&a));
        assert_eq!(store.history_len(), 3);
    }

    #[test]
    fn test_undo_redo_after_remove_restores_exact_sequence() {
        let mut store = store();
        let a = store.add_node(NodeKind::Api, "Call A", DEFAULT_NODE_COLOR).unwrap();
        store.add_node(NodeKind::Email, "Send B", DEFAULT_NODE_COLOR).unwrap();
        let before_remove = store.current_sequence().clone();

        assert!(store.remove_node(&a));
        let after_remove = store.current_sequence().clone();
        assert_eq!(
            after_remove.kinds(),
            vec![NodeKind::Start, NodeKind::Email, NodeKind::End]
        );

        assert!(store.undo());
        assert_eq!(store.current_sequence(), &before_remove);

        assert!(store.redo());
        assert_eq!(store.current_sequence(), &after_remove);
        assert!(!store.can_redo());
    }

    #[test]
    fn test_sentinels_cannot_be_removed() {
        let mut store = store();
        store.add_node(NodeKind::Api, "Call A", DEFAULT_NODE_COLOR);
        let before = store.current_sequence().clone();

        assert!(!store.remove_node("start"));
        assert!(!store.remove_node("end"));
        assert_eq!(store.current_sequence(), &before);

        store.undo();
        let before = store.current_sequence().clone();
        assert!(!store.remove_node("start"));
        assert!(!store.remove_node("end"));
        assert_eq!(store.current_sequence(), &before);
        assert!(store.can_redo());
    }

    #[test]
    fn test_undo_redo_restore_exact_sequences() {
        let mut store = store();
        let seeded = store.current_sequence().clone();

        store.add_node(NodeKind::Api, "Call A", DEFAULT_NODE_COLOR);
        let after_add = store.current_sequence().clone();

        assert!(store.undo());
        assert_eq!(store.current_sequence(), &seeded);

        assert!(store.redo());
        assert_eq!(store.current_sequence(), &after_add);

        assert!(!store.redo());
        assert_eq!(store.current_sequence(), &after_add);
    }

    #[test]
    fn test_undo_at_boundary_is_noop() {
        let mut store = store();
        assert!(!store.undo());
        assert_eq!(kinds(&store), vec![NodeKind::Start, NodeKind::End]);
        assert_eq!(store.history_index(), Some(0));
    }

    #[test]
    fn test_new_edit_discards_redo() {
        let mut store = store();
        store.add_node(NodeKind::Api, "Call A", DEFAULT_NODE_COLOR);
        store.add_node(NodeKind::Email, "Send B", DEFAULT_NODE_COLOR);
        store.undo();
        store.undo();

        store.add_node(NodeKind::Textbox, "Note", DEFAULT_NODE_COLOR);
        assert!(!store.can_redo());
        assert!(!store.redo());
        assert_eq!(
            kinds(&store),
            vec![NodeKind::Start, NodeKind::Textbox, NodeKind::End]
        );
    }

    #[test]
    fn test_insert_after_anchor() {
        let mut store = store();
        let a = store.add_node(NodeKind::Api, "Call A", DEFAULT_NODE_COLOR).unwrap();
        store.add_node(NodeKind::Email, "Send B", DEFAULT_NODE_COLOR);

        let note = store
            .insert_after(&a, NodeKind::Textbox, "Note", DEFAULT_NODE_COLOR)
            .unwrap();
        assert_eq!(store.current_sequence().position(&note), Some(2));

        let first = store
            .insert_after("start", NodeKind::Api, "First", DEFAULT_NODE_COLOR)
            .unwrap();
        assert_eq!(store.current_sequence().position(&first), Some(1));

        // Nothing may follow the end sentinel
        assert!(store
            .insert_after("end", NodeKind::Api, "Late", DEFAULT_NODE_COLOR)
            .is_none());
        assert!(store
            .insert_after("missing", NodeKind::Api, "Lost", DEFAULT_NODE_COLOR)
            .is_none());
        assert!(store.current_sequence().validate().is_ok());
    }

    #[test]
    fn test_history_capacity_bounds_undo() {
        let config = EditorConfig::default().with_history_capacity(3);
        let mut store =
            NodeSequenceStore::with_id_source(&config, Box::new(SequentialIdSource::default()));

        for i in 0..5 {
            store.add_node(NodeKind::Api, &format!("Call {}", i), DEFAULT_NODE_COLOR);
        }
        assert_eq!(store.history_len(), 3);

        assert!(store.undo());
        assert!(store.undo());
        assert!(!store.undo());
        // Oldest retained snapshot holds three API nodes
        assert_eq!(store.current_sequence().len(), 5);
    }

    #[test]
    fn test_from_payload_round_trip() {
        let mut store = store();
        store.add_node(NodeKind::Api, "Call A", DEFAULT_NODE_COLOR);
        let payload = store.to_payload();

        let mut hydrated = NodeSequenceStore::from_payload(
            &payload,
            &EditorConfig::default(),
            Box::new(SequentialIdSource::default()),
        )
        .unwrap();
        assert_eq!(hydrated.current_sequence(), store.current_sequence());
        assert!(!hydrated.can_undo());

        // Id source skips past hydrated ids
        let id = hydrated
            .add_node(NodeKind::Email, "Send B", DEFAULT_NODE_COLOR)
            .unwrap();
        assert_eq!(id, "node-2");
    }

    #[test]
    fn test_malformed_chain_is_never_extended() {
        let payload = WorkflowPayload {
            nodes: vec![SequenceNode::end(), SequenceNode::start()],
            last_edited_on: chrono::Utc::now(),
        };
        assert!(NodeSequenceStore::from_payload(
            &payload,
            &EditorConfig::default(),
            Box::new(SequentialIdSource::default()),
        )
        .is_err());
    }
}
