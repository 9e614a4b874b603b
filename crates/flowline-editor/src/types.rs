//! Core types for workflow node sequences
//!
//! A workflow is a single chain of nodes anchored by a `start` and an `end`
//! sentinel. These types describe the nodes, the ordered sequence and the
//! payload the sequence is persisted as.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a node
pub type NodeId = String;

/// Id of the seeded start sentinel
pub const START_ID: &str = "start";

/// Id of the seeded end sentinel
pub const END_ID: &str = "end";

/// Color tag used by the start sentinel and the insert palette
pub const DEFAULT_NODE_COLOR: &str = "#839e4b";

/// Color tag used by the end sentinel
pub const END_NODE_COLOR: &str = "#ee3425";

/// The kind of a node in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Entry sentinel. Exactly one, always first.
    Start,
    /// Exit sentinel. Exactly one, always last.
    End,
    /// Outbound API call
    Api,
    /// Email step
    Email,
    /// Free-form text box
    Textbox,
}

impl NodeKind {
    /// The kinds a user can insert between the sentinels
    pub const INSERTABLE: [NodeKind; 3] = [NodeKind::Api, NodeKind::Email, NodeKind::Textbox];

    /// Check if this kind is one of the fixed anchors
    pub fn is_sentinel(&self) -> bool {
        matches!(self, NodeKind::Start | NodeKind::End)
    }

    /// Label shown for this kind in the insert palette
    pub fn default_label(&self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::End => "End",
            NodeKind::Api => "API Call",
            NodeKind::Email => "Email",
            NodeKind::Textbox => "Text Box",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::End => "end",
            NodeKind::Api => "api",
            NodeKind::Email => "email",
            NodeKind::Textbox => "textbox",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown node kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNodeKind(pub String);

impl fmt::Display for UnknownNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown node kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownNodeKind {}

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(NodeKind::Start),
            "end" => Ok(NodeKind::End),
            "api" => Ok(NodeKind::Api),
            "email" => Ok(NodeKind::Email),
            "textbox" | "text-box" | "text_box" => Ok(NodeKind::Textbox),
            _ => Err(UnknownNodeKind(s.to_string())),
        }
    }
}

/// A node in the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceNode {
    /// Unique identifier for this node
    pub id: NodeId,
    /// Node kind
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Display label
    pub label: String,
    /// Color tag for border/edge rendering
    pub color: String,
}

impl SequenceNode {
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        label: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            color: color.into(),
        }
    }

    /// The seeded start sentinel
    pub fn start() -> Self {
        Self::new(START_ID, NodeKind::Start, "Start", DEFAULT_NODE_COLOR)
    }

    /// The seeded end sentinel
    pub fn end() -> Self {
        Self::new(END_ID, NodeKind::End, "End", END_NODE_COLOR)
    }

    pub fn is_sentinel(&self) -> bool {
        self.kind.is_sentinel()
    }
}

/// The ordered chain of nodes being edited
///
/// Read access is public; mutation is restricted to the store so the
/// sentinel invariant can only be changed through checked operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeSequence {
    nodes: Vec<SequenceNode>,
}

impl NodeSequence {
    /// The fresh `[start, end]` chain
    pub fn seeded() -> Self {
        Self {
            nodes: vec![SequenceNode::start(), SequenceNode::end()],
        }
    }

    /// Wrap an arbitrary node list without checking it
    ///
    /// Use [`NodeSequence::validate`] before trusting the result.
    pub fn from_nodes_unchecked(nodes: Vec<SequenceNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[SequenceNode] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SequenceNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node by ID
    pub fn find(&self, id: &str) -> Option<&SequenceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Index of a node by ID
    pub fn position(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Kinds in chain order
    pub fn kinds(&self) -> Vec<NodeKind> {
        self.nodes.iter().map(|n| n.kind).collect()
    }

    /// Indices of the first start and first end sentinel, if start precedes end
    pub fn anchors(&self) -> Option<(usize, usize)> {
        let start = self.nodes.iter().position(|n| n.kind == NodeKind::Start)?;
        let end = self.nodes.iter().position(|n| n.kind == NodeKind::End)?;
        (start < end).then_some((start, end))
    }

    /// Check the full sentinel and id-uniqueness invariant
    pub fn validate(&self) -> std::result::Result<(), String> {
        let Some(first) = self.nodes.first() else {
            return Err("sequence is empty".to_string());
        };
        if first.kind != NodeKind::Start {
            return Err(format!("first node '{}' is not a start node", first.id));
        }
        let last = &self.nodes[self.nodes.len() - 1];
        if last.kind != NodeKind::End {
            return Err(format!("last node '{}' is not an end node", last.id));
        }

        let mut seen = std::collections::HashSet::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if !seen.insert(node.id.as_str()) {
                return Err(format!("duplicate node id '{}'", node.id));
            }
            let interior = index != 0 && index != self.nodes.len() - 1;
            if interior && node.is_sentinel() {
                return Err(format!(
                    "sentinel node '{}' found inside the chain at {}",
                    node.id, index
                ));
            }
            if node.label.trim().is_empty() {
                return Err(format!("node '{}' has no label", node.id));
            }
        }
        Ok(())
    }

    pub(crate) fn insert(&mut self, index: usize, node: SequenceNode) {
        self.nodes.insert(index, node);
    }

    pub(crate) fn remove(&mut self, index: usize) -> SequenceNode {
        self.nodes.remove(index)
    }
}

impl Default for NodeSequence {
    fn default() -> Self {
        Self::seeded()
    }
}

impl<'a> IntoIterator for &'a NodeSequence {
    type Item = &'a SequenceNode;
    type IntoIter = std::slice::Iter<'a, SequenceNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Persisted form of a node sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPayload {
    /// Nodes in chain order
    pub nodes: Vec<SequenceNode>,
    /// When the sequence was last saved
    pub last_edited_on: DateTime<Utc>,
}

impl WorkflowPayload {
    /// Snapshot a sequence with the current time
    pub fn from_sequence(sequence: &NodeSequence) -> Self {
        Self::at(sequence, Utc::now())
    }

    /// Snapshot a sequence with an explicit timestamp
    pub fn at(sequence: &NodeSequence, last_edited_on: DateTime<Utc>) -> Self {
        Self {
            nodes: sequence.nodes().to_vec(),
            last_edited_on,
        }
    }

    /// Parse a payload from JSON text
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuild a checked sequence from this payload
    pub fn to_sequence(&self) -> crate::Result<NodeSequence> {
        let sequence = NodeSequence::from_nodes_unchecked(self.nodes.clone());
        sequence
            .validate()
            .map_err(crate::EditorError::invalid_payload)?;
        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_sequence_is_valid() {
        let seq = NodeSequence::seeded();
        assert_eq!(seq.kinds(), vec![NodeKind::Start, NodeKind::End]);
        assert_eq!(seq.anchors(), Some((0, 1)));
        assert!(seq.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_misplaced_sentinels() {
        let seq = NodeSequence::from_nodes_unchecked(vec![
            SequenceNode::end(),
            SequenceNode::start(),
        ]);
        assert!(seq.validate().is_err());
        assert_eq!(seq.anchors(), None);

        let seq = NodeSequence::from_nodes_unchecked(vec![
            SequenceNode::start(),
            SequenceNode::new("s2", NodeKind::Start, "Start", DEFAULT_NODE_COLOR),
            SequenceNode::end(),
        ]);
        assert!(seq.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_ids_and_blank_labels() {
        let seq = NodeSequence::from_nodes_unchecked(vec![
            SequenceNode::start(),
            SequenceNode::new("a", NodeKind::Api, "Call", DEFAULT_NODE_COLOR),
            SequenceNode::new("a", NodeKind::Email, "Mail", DEFAULT_NODE_COLOR),
            SequenceNode::end(),
        ]);
        assert!(seq.validate().unwrap_err().contains("duplicate"));

        let seq = NodeSequence::from_nodes_unchecked(vec![
            SequenceNode::start(),
            SequenceNode::new("a", NodeKind::Api, "  ", DEFAULT_NODE_COLOR),
            SequenceNode::end(),
        ]);
        assert!(seq.validate().unwrap_err().contains("label"));
    }

    #[test]
    fn test_node_kind_parsing() {
        assert_eq!("API".parse::<NodeKind>().unwrap(), NodeKind::Api);
        assert_eq!("text-box".parse::<NodeKind>().unwrap(), NodeKind::Textbox);
        assert!("branch".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_payload_json_shape() {
        let payload = WorkflowPayload::from_sequence(&NodeSequence::seeded());
        let json: serde_json::Value =
            serde_json::from_str(&payload.to_json().unwrap()).unwrap();

        assert_eq!(json["nodes"][0]["type"], "start");
        assert_eq!(json["nodes"][1]["id"], "end");
        assert!(json["lastEditedOn"].is_string());

        let back = WorkflowPayload::from_json(&payload.to_json().unwrap()).unwrap();
        assert_eq!(back.to_sequence().unwrap(), NodeSequence::seeded());
    }

    #[test]
    fn test_payload_with_broken_chain_is_rejected() {
        let json = r##"{"nodes":[{"id":"a","type":"api","label":"Call","color":"#839e4b"}],
                       "lastEditedOn":"2024-01-01T00:00:00Z"}"##;
        let payload = WorkflowPayload::from_json(json).unwrap();
        assert!(matches!(
            payload.to_sequence(),
            Err(crate::EditorError::InvalidPayload(_))
        ));
    }
}
