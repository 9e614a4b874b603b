//! Flowline Editor - linear workflow editing with bounded undo/redo
//!
//! This crate holds the editing core of the Flowline workflow builder. A
//! workflow is a single chain of nodes between a fixed `start` and `end`
//! sentinel. The crate provides:
//!
//! - `NodeSequenceStore`: the canonical chain plus its undo/redo history
//! - `UndoStack`: compressed, capacity-bounded snapshots
//! - `CanvasController`: gesture handling and zoom
//! - `WorkflowEditorView`: a pure render of the chain with insert affordances
//! - `WorkflowPayload`: the JSON form a chain is persisted as
//!
//! # Example
//!
//! ```
//! use flowline_editor::{CanvasController, EditorConfig, NodeKind};
//!
//! let mut canvas = CanvasController::new(&EditorConfig::default());
//! canvas.add_node(NodeKind::Api, "Call A", "#839e4b");
//! canvas.add_node(NodeKind::Email, "Send B", "#839e4b");
//! canvas.undo();
//!
//! let kinds = canvas.sequence().kinds();
//! assert_eq!(kinds, vec![NodeKind::Start, NodeKind::Api, NodeKind::End]);
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod ids;
pub mod store;
pub mod types;
pub mod undo;
pub mod view;
pub mod zoom;

// Re-export key types
pub use config::{EditorConfig, InsertPolicy};
pub use controller::CanvasController;
pub use error::{EditorError, Result};
pub use events::{EditorEvent, EventSink, HistoryDirection, NullEventSink, VecEventSink};
pub use ids::{NodeIdSource, SequentialIdSource, TimestampIdSource};
pub use store::NodeSequenceStore;
pub use types::{NodeId, NodeKind, NodeSequence, SequenceNode, WorkflowPayload};
pub use undo::UndoStack;
pub use view::{CanvasView, ViewIntent, ViewItem, WorkflowEditorView, INSERT_OPTIONS};
pub use zoom::Zoom;
