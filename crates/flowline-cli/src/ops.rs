//! Editing operations given on the `edit` command line
//!
//! Grammar: `add:<kind>[:label]`, `insert:<anchor>:<kind>[:label]`,
//! `del:<node-id>`, `undo`, `redo`, `zoom-in`, `zoom-out`, `zoom:<value>`.

use std::fmt;
use std::str::FromStr;

use flowline_editor::types::DEFAULT_NODE_COLOR;
use flowline_editor::view::insert_option;
use flowline_editor::{NodeId, NodeKind, ViewIntent};
use flowline_workflow_service::EditorSession;

#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    Add {
        kind: NodeKind,
        label: Option<String>,
    },
    Insert {
        anchor: NodeId,
        kind: NodeKind,
        label: Option<String>,
    },
    Delete(NodeId),
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    Zoom(f64),
}

impl FromStr for EditOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, rest) = match s.split_once(':') {
            Some((head, rest)) => (head, Some(rest)),
            None => (s, None),
        };

        let op = match (head, rest) {
            ("undo", None) => Self::Undo,
            ("redo", None) => Self::Redo,
            ("zoom-in", None) => Self::ZoomIn,
            ("zoom-out", None) => Self::ZoomOut,
            ("zoom", Some(value)) => Self::Zoom(
                value
                    .parse()
                    .map_err(|_| format!("invalid zoom value '{}'", value))?,
            ),
            ("del", Some(id)) if !id.is_empty() => Self::Delete(id.to_string()),
            ("add", Some(rest)) => {
                let (kind, label) = kind_and_label(rest)?;
                Self::Add { kind, label }
            }
            ("insert", Some(rest)) => {
                let (anchor, rest) = rest
                    .split_once(':')
                    .ok_or_else(|| format!("expected insert:<anchor>:<kind>, got '{}'", s))?;
                if anchor.is_empty() {
                    return Err(format!("missing anchor in '{}'", s));
                }
                let (kind, label) = kind_and_label(rest)?;
                Self::Insert {
                    anchor: anchor.to_string(),
                    kind,
                    label,
                }
            }
            _ => return Err(format!("unknown operation '{}'", s)),
        };
        Ok(op)
    }
}

fn kind_and_label(s: &str) -> Result<(NodeKind, Option<String>), String> {
    let (kind, label) = match s.split_once(':') {
        Some((kind, label)) => (kind, Some(label.to_string())),
        None => (s, None),
    };
    let kind = kind.parse::<NodeKind>().map_err(|e| e.to_string())?;
    Ok((kind, label.filter(|l| !l.trim().is_empty())))
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add { kind, .. } => write!(f, "add {}", kind),
            Self::Insert { anchor, kind, .. } => write!(f, "insert {} below {}", kind, anchor),
            Self::Delete(id) => write!(f, "delete {}", id),
            Self::Undo => write!(f, "undo"),
            Self::Redo => write!(f, "redo"),
            Self::ZoomIn => write!(f, "zoom in"),
            Self::ZoomOut => write!(f, "zoom out"),
            Self::Zoom(value) => write!(f, "zoom to {}", value),
        }
    }
}

impl EditOp {
    /// Apply to a session. Returns false if the operation had no effect.
    pub fn apply(&self, session: &mut EditorSession) -> bool {
        match self {
            Self::Add { kind, label } => {
                let (label, color) = appearance(*kind, label.as_deref());
                session.canvas_mut().add_node(*kind, label, color).is_some()
            }
            Self::Insert {
                anchor,
                kind,
                label,
            } => {
                let (label, color) = appearance(*kind, label.as_deref());
                session
                    .canvas_mut()
                    .request_insert_after(anchor, *kind, label, color)
                    .is_some()
            }
            Self::Delete(id) => session.dispatch(ViewIntent::Delete {
                node_id: id.clone(),
            }),
            Self::Undo => session.dispatch(ViewIntent::Undo),
            Self::Redo => session.dispatch(ViewIntent::Redo),
            Self::ZoomIn => session.dispatch(ViewIntent::ZoomIn),
            Self::ZoomOut => session.dispatch(ViewIntent::ZoomOut),
            Self::Zoom(value) => session.dispatch(ViewIntent::SetZoom(*value)),
        }
    }
}

/// Label and color for a new node, taken from the insert menu when the kind
/// is offered there
fn appearance(kind: NodeKind, label: Option<&str>) -> (&str, &'static str) {
    let option = insert_option(kind);
    let label = label
        .or(option.map(|o| o.label))
        .unwrap_or(kind.default_label());
    let color = option.map(|o| o.color).unwrap_or(DEFAULT_NODE_COLOR);
    (label, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_ops() {
        assert_eq!("undo".parse::<EditOp>(), Ok(EditOp::Undo));
        assert_eq!("redo".parse::<EditOp>(), Ok(EditOp::Redo));
        assert_eq!("zoom-in".parse::<EditOp>(), Ok(EditOp::ZoomIn));
        assert_eq!("zoom-out".parse::<EditOp>(), Ok(EditOp::ZoomOut));
        assert_eq!("zoom:1.5".parse::<EditOp>(), Ok(EditOp::Zoom(1.5)));
        assert_eq!(
            "del:node-1".parse::<EditOp>(),
            Ok(EditOp::Delete("node-1".to_string()))
        );
    }

    #[test]
    fn test_parse_add_and_insert() {
        assert_eq!(
            "add:api".parse::<EditOp>(),
            Ok(EditOp::Add {
                kind: NodeKind::Api,
                label: None
            })
        );
        assert_eq!(
            "add:email:Send welcome".parse::<EditOp>(),
            Ok(EditOp::Add {
                kind: NodeKind::Email,
                label: Some("Send welcome".to_string())
            })
        );
        assert_eq!(
            "insert:start:textbox".parse::<EditOp>(),
            Ok(EditOp::Insert {
                anchor: "start".to_string(),
                kind: NodeKind::Textbox,
                label: None
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<EditOp>().is_err());
        assert!("undo:1".parse::<EditOp>().is_err());
        assert!("zoom:big".parse::<EditOp>().is_err());
        assert!("add:webhook".parse::<EditOp>().is_err());
        assert!("insert:start".parse::<EditOp>().is_err());
        assert!("insert::api".parse::<EditOp>().is_err());
        assert!("del:".parse::<EditOp>().is_err());
    }

    #[test]
    fn test_appearance_defaults_to_menu_entry() {
        let (label, color) = appearance(NodeKind::Api, None);
        assert_eq!(label, "API Call");
        assert_eq!(color, "#839e4b");

        let (label, _) = appearance(NodeKind::Email, Some("Welcome"));
        assert_eq!(label, "Welcome");
    }
}
