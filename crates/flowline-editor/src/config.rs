//! Editor configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::undo::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_HISTORY_CAPACITY};
use crate::zoom::DEFAULT_ZOOM;

/// Where a "+" on a connector places the new node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsertPolicy {
    /// Every insert lands immediately before the end node, whichever
    /// connector was clicked
    #[default]
    BeforeEnd,
    /// Insert directly after the node the connector hangs below
    AfterAnchor,
}

/// Configuration for an editing session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of history snapshots kept
    pub history_capacity: usize,
    /// zstd level used for history snapshots
    pub compression_level: i32,
    /// How connector inserts are resolved
    pub insert_policy: InsertPolicy,
    /// Zoom level a session starts at
    pub default_zoom: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            insert_policy: InsertPolicy::default(),
            default_zoom: DEFAULT_ZOOM,
        }
    }
}

impl EditorConfig {
    /// Load configuration from a JSON file, falling back to defaults if absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Builder-style override of the insert policy
    pub fn with_insert_policy(mut self, policy: InsertPolicy) -> Self {
        self.insert_policy = policy;
        self
    }

    /// Builder-style override of the history capacity
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}
