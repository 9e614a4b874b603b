//! Undo/redo history using compressed snapshots
//!
//! Every accepted edit records the complete node sequence as an immutable
//! snapshot. The stack keeps a pointer to the live snapshot; pushing a new
//! snapshot discards everything after the pointer, and the stack holds at
//! most `capacity` snapshots, dropping the oldest first.
//!
//! Snapshots are stored as zstd-compressed JSON. A chain of a few dozen
//! nodes compresses to a handful of bytes per repeated field, which keeps
//! long editing sessions cheap.

use std::collections::VecDeque;

use crate::error::{EditorError, Result};
use crate::types::NodeSequence;

/// Default number of snapshots kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default zstd level for snapshots
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Undo/redo stack using compressed snapshots
#[derive(Debug)]
pub struct UndoStack {
    /// Compressed sequence states (zstd)
    snapshots: VecDeque<Vec<u8>>,
    /// Current position in the stack
    current: usize,
    /// Maximum number of snapshots to keep
    capacity: usize,
    /// zstd compression level
    level: i32,
}

impl UndoStack {
    /// Create a new undo stack with the specified maximum size
    pub fn new(capacity: usize) -> Self {
        Self::with_level(capacity, DEFAULT_COMPRESSION_LEVEL)
    }

    /// Create a new undo stack with an explicit compression level
    pub fn with_level(capacity: usize, level: i32) -> Self {
        Self {
            snapshots: VecDeque::new(),
            current: 0,
            capacity: capacity.max(1),
            level,
        }
    }

    /// Compress a sequence into a snapshot without touching the stack
    ///
    /// Split from [`UndoStack::push_encoded`] so callers can fail before
    /// committing an edit.
    pub fn encode(&self, sequence: &NodeSequence) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(sequence)?;
        zstd::encode_all(&json[..], self.level).map_err(|e| EditorError::Compression(e.to_string()))
    }

    /// Push a new snapshot onto the stack
    ///
    /// This truncates any redo history (snapshots after current position).
    pub fn push(&mut self, sequence: &NodeSequence) -> Result<()> {
        let compressed = self.encode(sequence)?;
        self.push_encoded(compressed);
        Ok(())
    }

    /// Push an already compressed snapshot
    pub fn push_encoded(&mut self, compressed: Vec<u8>) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.current + 1);
        }

        self.snapshots.push_back(compressed);
        self.current = self.snapshots.len() - 1;

        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
            self.current = self.current.saturating_sub(1);
        }
    }

    /// Undo: move back one snapshot
    ///
    /// Returns the previous sequence, or None if at the beginning.
    /// The pointer only moves when the snapshot decodes.
    pub fn undo(&mut self) -> Option<Result<NodeSequence>> {
        if !self.can_undo() {
            return None;
        }
        let decoded = self.decompress(self.current - 1);
        if decoded.is_ok() {
            self.current -= 1;
        }
        Some(decoded)
    }

    /// Redo: move forward one snapshot
    ///
    /// Returns the next sequence, or None if at the end.
    pub fn redo(&mut self) -> Option<Result<NodeSequence>> {
        if !self.can_redo() {
            return None;
        }
        let decoded = self.decompress(self.current + 1);
        if decoded.is_ok() {
            self.current += 1;
        }
        Some(decoded)
    }

    /// Get the current sequence without modifying the stack
    pub fn current(&self) -> Option<Result<NodeSequence>> {
        if self.snapshots.is_empty() {
            None
        } else {
            Some(self.decompress(self.current))
        }
    }

    /// Pointer into the stack, or None when empty
    pub fn index(&self) -> Option<usize> {
        (!self.snapshots.is_empty()).then_some(self.current)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.snapshots.len()
    }

    /// Get the number of snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear all snapshots
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current = 0;
    }

    /// Get the total compressed size of all snapshots
    pub fn compressed_size(&self) -> usize {
        self.snapshots.iter().map(|s| s.len()).sum()
    }

    /// Decompress a snapshot at the given index
    fn decompress(&self, index: usize) -> Result<NodeSequence> {
        let compressed = self
            .snapshots
            .get(index)
            .ok_or(EditorError::SnapshotOutOfRange {
                index,
                len: self.snapshots.len(),
            })?;
        let json = zstd::decode_all(&compressed[..])
            .map_err(|e| EditorError::Compression(e.to_string()))?;
        let sequence: NodeSequence = serde_json::from_slice(&json)?;
        Ok(sequence)
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeKind, SequenceNode, DEFAULT_NODE_COLOR};

    fn make_sequence(labels: &[&str]) -> NodeSequence {
        let mut nodes = vec![SequenceNode::start()];
        for (i, label) in labels.iter().enumerate() {
            nodes.push(SequenceNode::new(
                format!("n{}", i),
                NodeKind::Api,
                *label,
                DEFAULT_NODE_COLOR,
            ));
        }
        nodes.push(SequenceNode::end());
        NodeSequence::from_nodes_unchecked(nodes)
    }

    #[test]
    fn test_push_and_undo() {
        let mut stack = UndoStack::new(10);

        let first = make_sequence(&[]);
        let second = make_sequence(&["a"]);
        let third = make_sequence(&["a", "b"]);

        stack.push(&first).unwrap();
        stack.push(&second).unwrap();
        stack.push(&third).unwrap();

        assert_eq!(stack.current().unwrap().unwrap(), third);

        let undone = stack.undo().unwrap().unwrap();
        assert_eq!(undone, second);

        let undone = stack.undo().unwrap().unwrap();
        assert_eq!(undone, first);

        // Can't undo further
        assert!(stack.undo().is_none());
        assert_eq!(stack.index(), Some(0));
    }

    #[test]
    fn test_redo() {
        let mut stack = UndoStack::new(10);

        stack.push(&make_sequence(&[])).unwrap();
        stack.push(&make_sequence(&["a"])).unwrap();

        stack.undo();

        let redone = stack.redo().unwrap().unwrap();
        assert_eq!(redone, make_sequence(&["a"]));

        // Can't redo further
        assert!(stack.redo().is_none());
    }

    #[test]
    fn test_push_truncates_redo() {
        let mut stack = UndoStack::new(10);

        stack.push(&make_sequence(&[])).unwrap();
        stack.push(&make_sequence(&["a"])).unwrap();
        stack.undo();

        stack.push(&make_sequence(&["b"])).unwrap();

        assert!(!stack.can_redo());
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.current().unwrap().unwrap(), make_sequence(&["b"]));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut stack = UndoStack::new(3);

        for i in 0..5 {
            let label = format!("step_{}", i);
            stack.push(&make_sequence(&[label.as_str()])).unwrap();
        }

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.index(), Some(2));
        assert_eq!(stack.current().unwrap().unwrap(), make_sequence(&["step_4"]));

        // Only step_3 and step_2 remain behind the pointer
        stack.undo();
        let oldest = stack.undo().unwrap().unwrap();
        assert_eq!(oldest, make_sequence(&["step_2"]));
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut stack = UndoStack::new(0);
        stack.push(&make_sequence(&[])).unwrap();
        stack.push(&make_sequence(&["a"])).unwrap();
        assert_eq!(stack.capacity(), 1);
        assert_eq!(stack.len(), 1);
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_can_undo_redo() {
        let mut stack = UndoStack::new(10);

        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.index(), None);

        stack.push(&make_sequence(&[])).unwrap();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());

        stack.push(&make_sequence(&["a"])).unwrap();
        assert!(stack.can_undo());
        assert!(!stack.can_redo());

        stack.undo();
        assert!(!stack.can_undo());
        assert!(stack.can_redo());
    }
}
