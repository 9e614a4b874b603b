//! Workflow storage with file persistence.
//!
//! A [`WorkflowSource`] that keeps workflows in memory, with optional JSON
//! file persistence (one file per workflow) for durability across restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flowline_editor::WorkflowPayload;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServiceError};
use crate::workflow::{WorkflowId, WorkflowSource, WorkflowSummary};

/// A workflow row plus its saved node chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub summary: WorkflowSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<WorkflowPayload>,
}

/// In-memory workflow repository with optional file persistence.
///
/// # Example
///
/// ```ignore
/// use flowline_workflow_service::WorkflowRepository;
///
/// let mut repo = WorkflowRepository::with_persistence(".flowline/workflows");
/// let count = repo.load_from_disk()?;
/// println!("Loaded {} workflows", count);
/// ```
#[derive(Debug, Default)]
pub struct WorkflowRepository {
    /// Stored workflows, keyed by ID.
    records: HashMap<WorkflowId, WorkflowRecord>,
    /// Optional path for file persistence.
    persist_path: Option<PathBuf>,
}

impl WorkflowRepository {
    /// Create a new in-memory repository without persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository that persists to the given directory.
    ///
    /// The directory will be created if it doesn't exist when saving.
    pub fn with_persistence(path: impl AsRef<Path>) -> Self {
        Self {
            records: HashMap::new(),
            persist_path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Load all workflows from the persistence directory.
    ///
    /// Returns the number of workflows loaded.
    pub fn load_from_disk(&mut self) -> Result<usize> {
        let Some(ref path) = self.persist_path else {
            return Ok(0);
        };

        if !path.exists() {
            return Ok(0);
        }

        let mut count = 0;
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let file_path = entry.path();

            if file_path.extension().is_some_and(|e| e == "json") {
                let content = std::fs::read_to_string(&file_path)?;
                match serde_json::from_str::<WorkflowRecord>(&content) {
                    Ok(record) => {
                        log::info!("Loaded workflow '{}' from {:?}", record.summary.id, file_path);
                        self.records.insert(record.summary.id.clone(), record);
                        count += 1;
                    }
                    Err(e) => {
                        log::warn!("Failed to parse workflow from {:?}: {}", file_path, e);
                    }
                }
            }
        }
        Ok(count)
    }

    /// File for a workflow id. Bytes outside `[A-Za-z0-9-]` (including `_`)
    /// are written as `_xx` hex, so distinct ids never share a file.
    fn file_path(dir: &Path, id: &str) -> PathBuf {
        let mut name = String::with_capacity(id.len());
        for byte in id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("_{:02x}", byte));
            }
        }
        dir.join(format!("{}.json", name))
    }

    /// Save a workflow to disk (if persistence is enabled).
    fn save_to_disk(&self, record: &WorkflowRecord) -> Result<()> {
        let Some(ref path) = self.persist_path else {
            return Ok(());
        };

        std::fs::create_dir_all(path)?;
        let file_path = Self::file_path(path, &record.summary.id);
        let content = serde_json::to_string_pretty(record)?;
        std::fs::write(&file_path, content)?;
        log::debug!("Saved workflow '{}' to {:?}", record.summary.id, file_path);
        Ok(())
    }

    /// Delete a workflow from disk (if persistence is enabled).
    fn delete_from_disk(&self, id: &str) -> Result<()> {
        let Some(ref path) = self.persist_path else {
            return Ok(());
        };

        let file_path = Self::file_path(path, id);
        if file_path.exists() {
            std::fs::remove_file(&file_path)?;
            log::debug!("Deleted workflow '{}' from {:?}", id, file_path);
        }
        Ok(())
    }

    /// Get a workflow record by ID.
    pub fn get(&self, id: &str) -> Option<&WorkflowRecord> {
        self.records.get(id)
    }

    /// Check if a workflow exists.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record_mut(&mut self, id: &str) -> Result<&mut WorkflowRecord> {
        self.records
            .get_mut(id)
            .ok_or_else(|| ServiceError::WorkflowNotFound(id.to_string()))
    }
}

impl WorkflowSource for WorkflowRepository {
    /// Newest edits first
    fn list_workflows(&self) -> Result<Vec<WorkflowSummary>> {
        let mut rows: Vec<WorkflowSummary> = self
            .records
            .values()
            .map(|r| WorkflowSummary {
                is_pinned: false,
                ..r.summary.clone()
            })
            .collect();
        rows.sort_by(|a, b| {
            b.last_edited_on
                .cmp(&a.last_edited_on)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    fn get_payload(&self, id: &str) -> Result<Option<WorkflowPayload>> {
        self.records
            .get(id)
            .map(|r| r.payload.clone())
            .ok_or_else(|| ServiceError::WorkflowNotFound(id.to_string()))
    }

    fn save_workflow(&mut self, id: &str, payload: &WorkflowPayload) -> Result<()> {
        // Never persist a chain that could not be opened again
        payload.to_sequence()?;

        let record = self.record_mut(id)?;
        record.payload = Some(payload.clone());
        record.summary.last_edited_on = payload.last_edited_on;
        let record = record.clone();
        self.save_to_disk(&record)
    }

    fn mark_edited(&mut self, id: &str, edited_by: &str, at: DateTime<Utc>) -> Result<()> {
        let record = self.record_mut(id)?;
        record.summary.last_edited_by = edited_by.to_string();
        record.summary.last_edited_on = at;
        let record = record.clone();
        self.save_to_disk(&record)
    }

    fn create_workflow(&mut self, summary: WorkflowSummary) -> Result<WorkflowSummary> {
        if summary.name.trim().is_empty() {
            return Err(ServiceError::InvalidWorkflow("name is required".to_string()));
        }
        if self.records.contains_key(&summary.id) {
            return Err(ServiceError::InvalidWorkflow(format!(
                "id '{}' already exists",
                summary.id
            )));
        }
        let record = WorkflowRecord {
            summary: summary.clone(),
            payload: None,
        };
        self.save_to_disk(&record)?;
        self.records.insert(summary.id.clone(), record);
        Ok(summary)
    }

    fn delete_workflow(&mut self, id: &str) -> Result<bool> {
        self.delete_from_disk(id)?;
        Ok(self.records.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flowline_editor::NodeSequence;
    use tempfile::TempDir;

    fn summary(id: &str, name: &str, day: u32) -> WorkflowSummary {
        WorkflowSummary {
            id: id.to_string(),
            name: name.to_string(),
            last_edited_by: "ada".to_string(),
            last_edited_on: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
            description: String::new(),
            is_pinned: false,
        }
    }

    #[test]
    fn test_in_memory_repository() {
        let mut repo = WorkflowRepository::new();

        repo.create_workflow(summary("#001", "Older", 1)).unwrap();
        repo.create_workflow(summary("#002", "Newer", 2)).unwrap();

        let list = repo.list_workflows().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "#002");

        assert_eq!(repo.get_payload("#001").unwrap(), None);
        assert!(matches!(
            repo.get_payload("#404"),
            Err(ServiceError::WorkflowNotFound(_))
        ));

        assert!(repo.delete_workflow("#001").unwrap());
        assert!(!repo.delete_workflow("#001").unwrap());
    }

    #[test]
    fn test_create_rejects_duplicates_and_blank_names() {
        let mut repo = WorkflowRepository::new();
        repo.create_workflow(summary("#001", "A", 1)).unwrap();
        assert!(repo.create_workflow(summary("#001", "B", 1)).is_err());
        assert!(repo.create_workflow(summary("#002", " ", 1)).is_err());
    }

    #[test]
    fn test_save_updates_summary() {
        let mut repo = WorkflowRepository::new();
        repo.create_workflow(summary("#001", "A", 1)).unwrap();

        let payload = WorkflowPayload::from_sequence(&NodeSequence::seeded());
        repo.save_workflow("#001", &payload).unwrap();
        repo.mark_edited("#001", "bob", payload.last_edited_on).unwrap();

        let record = repo.get("#001").unwrap();
        assert_eq!(record.payload.as_ref(), Some(&payload));
        assert_eq!(record.summary.last_edited_by, "bob");
        assert_eq!(record.summary.last_edited_on, payload.last_edited_on);

        assert!(repo.save_workflow("#404", &payload).is_err());
    }

    #[test]
    fn test_save_rejects_broken_chain() {
        let mut repo = WorkflowRepository::new();
        repo.create_workflow(summary("#001", "A", 1)).unwrap();

        let payload = WorkflowPayload {
            nodes: Vec::new(),
            last_edited_on: Utc::now(),
        };
        assert!(matches!(
            repo.save_workflow("#001", &payload),
            Err(ServiceError::Editor(_))
        ));
        assert!(repo.get("#001").unwrap().payload.is_none());
    }

    #[test]
    fn test_file_names_do_not_collide() {
        let dir = Path::new("workflows");
        assert_eq!(
            WorkflowRepository::file_path(dir, "#001"),
            dir.join("_23001.json")
        );
        assert_ne!(
            WorkflowRepository::file_path(dir, "#001"),
            WorkflowRepository::file_path(dir, "_001")
        );

        let temp_dir = TempDir::new().unwrap();
        let persist_path = temp_dir.path().join("workflows");
        {
            let mut repo = WorkflowRepository::with_persistence(&persist_path);
            repo.create_workflow(summary("#001", "Hash", 1)).unwrap();
            repo.create_workflow(summary("_001", "Underscore", 2)).unwrap();
        }

        let mut repo = WorkflowRepository::with_persistence(&persist_path);
        assert_eq!(repo.load_from_disk().unwrap(), 2);
        assert_eq!(repo.get("#001").unwrap().summary.name, "Hash");
        assert_eq!(repo.get("_001").unwrap().summary.name, "Underscore");
    }

    #[test]
    fn test_persistent_repository() {
        let temp_dir = TempDir::new().unwrap();
        let persist_path = temp_dir.path().join("workflows");

        {
            let mut repo = WorkflowRepository::with_persistence(&persist_path);
            repo.create_workflow(summary("#001", "Persisted", 1)).unwrap();
            repo.create_workflow(summary("#002", "Deleted", 2)).unwrap();
            let payload = WorkflowPayload::from_sequence(&NodeSequence::seeded());
            repo.save_workflow("#001", &payload).unwrap();
            repo.delete_workflow("#002").unwrap();
        }

        {
            let mut repo = WorkflowRepository::with_persistence(&persist_path);
            let count = repo.load_from_disk().unwrap();
            assert_eq!(count, 1);
            assert!(repo.get_payload("#001").unwrap().is_some());
            assert!(!repo.contains("#002"));
        }
    }
}
