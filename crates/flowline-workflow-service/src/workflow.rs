//! Workflow records and the source they are fetched from

use chrono::{DateTime, FixedOffset, Utc};
use flowline_editor::WorkflowPayload;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Unique identifier for a workflow
pub type WorkflowId = String;

/// A row in the workflow list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub id: WorkflowId,
    pub name: String,
    pub last_edited_by: String,
    pub last_edited_on: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    /// Local pin state; sources always report false
    #[serde(default)]
    pub is_pinned: bool,
}

impl WorkflowSummary {
    /// "Last edited on" as shown in the list, e.g. `14:05 IST-17/10/26`
    pub fn last_edited_label(&self) -> String {
        format_edited_on(self.last_edited_on)
    }
}

/// Render a timestamp in India Standard Time, the list's display zone
pub fn format_edited_on(at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(5 * 3600 + 30 * 60) {
        Some(ist) => at.with_timezone(&ist).format("%H:%M IST-%d/%m/%y").to_string(),
        None => at.format("%H:%M UTC-%d/%m/%y").to_string(),
    }
}

/// Where workflows are listed from and saved to
pub trait WorkflowSource {
    /// All workflow rows
    fn list_workflows(&self) -> Result<Vec<WorkflowSummary>>;

    /// The saved node chain for a workflow, if one has been saved
    ///
    /// Errors with `WorkflowNotFound` for unknown ids.
    fn get_payload(&self, id: &str) -> Result<Option<WorkflowPayload>>;

    /// Persist a node chain for a workflow
    fn save_workflow(&mut self, id: &str, payload: &WorkflowPayload) -> Result<()>;

    /// Record who last edited a workflow and when
    fn mark_edited(&mut self, id: &str, edited_by: &str, at: DateTime<Utc>) -> Result<()>;

    /// Add a workflow row
    fn create_workflow(&mut self, summary: WorkflowSummary) -> Result<WorkflowSummary>;

    /// Remove a workflow. Returns false if it did not exist.
    fn delete_workflow(&mut self, id: &str) -> Result<bool>;
}
