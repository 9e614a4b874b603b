//! Workflow editor view
//!
//! A pure render of `(sequence, zoom)` into a flat list of view items:
//! sentinel caps, node cards, and a connector with an insert affordance
//! between every adjacent pair. The only state the view owns is which
//! insert menu is open; everything else lives in the controller.

use std::fmt;

use serde::Serialize;

use crate::controller::CanvasController;
use crate::types::{NodeId, NodeKind, DEFAULT_NODE_COLOR};

/// An entry in the insert palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsertOption {
    pub kind: NodeKind,
    pub label: &'static str,
    pub color: &'static str,
}

/// The palette shown when a connector's "+" is opened
pub static INSERT_OPTIONS: [InsertOption; 3] = [
    InsertOption {
        kind: NodeKind::Api,
        label: "API Call",
        color: DEFAULT_NODE_COLOR,
    },
    InsertOption {
        kind: NodeKind::Email,
        label: "Email",
        color: DEFAULT_NODE_COLOR,
    },
    InsertOption {
        kind: NodeKind::Textbox,
        label: "Text Box",
        color: DEFAULT_NODE_COLOR,
    },
];

/// Look up the palette entry for a kind
pub fn insert_option(kind: NodeKind) -> Option<&'static InsertOption> {
    INSERT_OPTIONS.iter().find(|o| o.kind == kind)
}

/// One rendered element of the vertical chain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "item", rename_all = "camelCase")]
pub enum ViewItem {
    /// Rounded end-cap for a sentinel
    Cap {
        id: NodeId,
        kind: NodeKind,
        label: String,
        color: String,
    },
    /// Labeled card for an intermediate node
    Card {
        id: NodeId,
        kind: NodeKind,
        label: String,
        color: String,
        deletable: bool,
    },
    /// Connector below `below`, carrying the insert affordance
    #[serde(rename_all = "camelCase")]
    Connector { below: NodeId, menu_open: bool },
}

/// Everything needed to draw the canvas once
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasView {
    pub items: Vec<ViewItem>,
    pub zoom: f64,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl CanvasView {
    /// Node ids in render order
    pub fn node_ids(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                ViewItem::Cap { id, .. } | ViewItem::Card { id, .. } => Some(id.as_str()),
                ViewItem::Connector { .. } => None,
            })
            .collect()
    }

    pub fn connector_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, ViewItem::Connector { .. }))
            .count()
    }
}

impl fmt::Display for CanvasView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "zoom {}% | undo {} | redo {}",
            (self.zoom * 100.0).round(),
            if self.can_undo { "on" } else { "off" },
            if self.can_redo { "on" } else { "off" },
        )?;
        for item in &self.items {
            match item {
                ViewItem::Cap { id, label, .. } => writeln!(f, "  ( {} )  #{}", label, id)?,
                ViewItem::Card {
                    id, kind, label, ..
                } => writeln!(f, "  [ {} ]  #{} <{}> [x]", label, id, kind)?,
                ViewItem::Connector { menu_open, .. } => {
                    writeln!(f, "      |")?;
                    writeln!(f, "     (+)")?;
                    if *menu_open {
                        for option in &INSERT_OPTIONS {
                            writeln!(f, "        > {}", option.label)?;
                        }
                    }
                    writeln!(f, "      |")?;
                }
            }
        }
        Ok(())
    }
}

/// User intents the canvas can dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum ViewIntent {
    OpenInsertMenu { below: NodeId },
    CloseInsertMenu,
    Insert { below: NodeId, kind: NodeKind },
    Delete { node_id: NodeId },
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    SetZoom(f64),
}

/// Renders the chain and wires intents to the controller
#[derive(Debug, Default)]
pub struct WorkflowEditorView {
    open_menu: Option<NodeId>,
}

impl WorkflowEditorView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector whose insert menu is open, if any
    pub fn open_menu(&self) -> Option<&str> {
        self.open_menu.as_deref()
    }

    /// Render the controller's current state
    pub fn render(&self, controller: &CanvasController) -> CanvasView {
        let sequence = controller.sequence();
        let last = sequence.len().saturating_sub(1);
        let mut items = Vec::with_capacity(sequence.len() * 2);

        for (index, node) in sequence.iter().enumerate() {
            if node.is_sentinel() {
                items.push(ViewItem::Cap {
                    id: node.id.clone(),
                    kind: node.kind,
                    label: node.label.clone(),
                    color: node.color.clone(),
                });
            } else {
                items.push(ViewItem::Card {
                    id: node.id.clone(),
                    kind: node.kind,
                    label: node.label.clone(),
                    color: node.color.clone(),
                    deletable: true,
                });
            }

            if index < last {
                items.push(ViewItem::Connector {
                    below: node.id.clone(),
                    menu_open: self.open_menu.as_deref() == Some(node.id.as_str()),
                });
            }
        }

        CanvasView {
            items,
            zoom: controller.zoom(),
            can_undo: controller.store().can_undo(),
            can_redo: controller.store().can_redo(),
        }
    }

    /// Apply an intent. Returns true if anything visible changed.
    pub fn dispatch(&mut self, intent: ViewIntent, controller: &mut CanvasController) -> bool {
        let changed = match intent {
            ViewIntent::OpenInsertMenu { below } => {
                let sequence = controller.sequence();
                let has_connector = sequence
                    .position(&below)
                    .is_some_and(|index| index + 1 < sequence.len());
                if has_connector {
                    self.open_menu = Some(below);
                    true
                } else {
                    false
                }
            }
            ViewIntent::CloseInsertMenu => self.open_menu.take().is_some(),
            ViewIntent::Insert { below, kind } => {
                self.open_menu = None;
                match insert_option(kind) {
                    Some(option) => controller
                        .request_insert_after(&below, option.kind, option.label, option.color)
                        .is_some(),
                    None => false,
                }
            }
            ViewIntent::Delete { node_id } => controller.request_delete(&node_id),
            ViewIntent::Undo => controller.undo(),
            ViewIntent::Redo => controller.redo(),
            ViewIntent::ZoomIn => Self::zoom_changed(controller, CanvasController::zoom_in),
            ViewIntent::ZoomOut => Self::zoom_changed(controller, CanvasController::zoom_out),
            ViewIntent::ResetZoom => Self::zoom_changed(controller, CanvasController::reset_zoom),
            ViewIntent::SetZoom(value) => {
                let before = controller.zoom();
                controller.set_zoom(value) != before
            }
        };

        // A menu hanging off a node that undo/delete removed has nothing to anchor to
        if let Some(anchor) = &self.open_menu {
            if !controller.sequence().contains(anchor) {
                self.open_menu = None;
            }
        }
        changed
    }

    fn zoom_changed(
        controller: &mut CanvasController,
        op: fn(&mut CanvasController) -> f64,
    ) -> bool {
        let before = controller.zoom();
        op(controller) != before
    }
}
