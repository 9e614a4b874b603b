//! Workflow list state: search, pins and pagination
//!
//! The catalog holds a local copy of the rows a [`WorkflowSource`] lists.
//! Pins never leave the catalog; sources always report rows unpinned.

use chrono::Utc;

use crate::auth::display_name;
use crate::error::{Result, ServiceError};
use crate::workflow::{WorkflowSource, WorkflowSummary};

/// Rows shown per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Attempts at finding an unused `#NNN` id before giving up
const MAX_ID_ATTEMPTS: usize = 64;

/// Outcome of a pin toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinChange {
    pub name: String,
    pub pinned: bool,
}

impl PinChange {
    /// Notice text, e.g. "Onboarding Pinned"
    pub fn message(&self) -> String {
        if self.pinned {
            format!("{} Pinned", self.name)
        } else {
            format!("{} Unpinned", self.name)
        }
    }
}

/// The workflow list as the user sees it
#[derive(Debug, Clone)]
pub struct WorkflowCatalog {
    rows: Vec<WorkflowSummary>,
    query: String,
    page: usize,
    page_size: usize,
}

impl WorkflowCatalog {
    /// Fetch every row from the source, all unpinned
    pub fn load(source: &dyn WorkflowSource, page_size: usize) -> Result<Self> {
        let rows = source
            .list_workflows()?
            .into_iter()
            .map(|row| WorkflowSummary {
                is_pinned: false,
                ..row
            })
            .collect::<Vec<_>>();
        log::debug!("Loaded {} workflows into catalog", rows.len());
        Ok(Self::from_rows(rows, page_size))
    }

    pub fn from_rows(rows: Vec<WorkflowSummary>, page_size: usize) -> Self {
        Self {
            rows,
            query: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// All rows in list order, ignoring search and pins
    pub fn rows(&self) -> &[WorkflowSummary] {
        &self.rows
    }

    pub fn get(&self, id: &str) -> Option<&WorkflowSummary> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Filter by name or id. Resets to the first page.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    fn matches(&self, row: &WorkflowSummary) -> bool {
        let needle = self.query.trim().to_lowercase();
        needle.is_empty()
            || row.name.to_lowercase().contains(&needle)
            || row.id.to_lowercase().contains(&needle)
    }

    /// Rows matching the search, pinned rows first
    pub fn visible(&self) -> Vec<&WorkflowSummary> {
        let mut rows: Vec<&WorkflowSummary> =
            self.rows.iter().filter(|row| self.matches(row)).collect();
        // stable: keeps list order within each group
        rows.sort_by_key(|row| !row.is_pinned);
        rows
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages; zero when nothing matches
    pub fn total_pages(&self) -> usize {
        self.visible().len().div_ceil(self.page_size)
    }

    /// 1-based current page
    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Jump to a page, clamped to the available range
    pub fn set_page(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.total_pages().max(1));
        self.page
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.page + 1)
    }

    pub fn previous_page(&mut self) -> usize {
        self.set_page(self.page.saturating_sub(1))
    }

    /// Rows on the current page
    pub fn page_items(&self) -> Vec<&WorkflowSummary> {
        let start = (self.page - 1) * self.page_size;
        self.visible()
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }

    // =========================================================================
    // Row operations
    // =========================================================================

    /// Flip a row's pin. Returns None for unknown ids.
    pub fn toggle_pin(&mut self, id: &str) -> Option<PinChange> {
        let row = self.rows.iter_mut().find(|row| row.id == id)?;
        row.is_pinned = !row.is_pinned;
        Some(PinChange {
            name: row.name.clone(),
            pinned: row.is_pinned,
        })
    }

    /// Ids of pinned rows, in list order
    pub fn pinned_ids(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| row.is_pinned)
            .map(|row| row.id.clone())
            .collect()
    }

    /// Pin exactly the given ids; unknown ids are ignored
    pub fn apply_pins<S: AsRef<str>>(&mut self, ids: &[S]) {
        for row in &mut self.rows {
            row.is_pinned = ids.iter().any(|id| id.as_ref() == row.id);
        }
    }

    /// Delete through the source, then drop the local row
    pub fn delete(&mut self, source: &mut dyn WorkflowSource, id: &str) -> Result<bool> {
        let before = self.rows.len();
        let removed = source.delete_workflow(id)?;
        self.rows.retain(|row| row.id != id);
        let removed = removed || self.rows.len() != before;
        if removed {
            log::info!("Deleted workflow '{}'", id);
        }
        self.set_page(self.page);
        Ok(removed)
    }

    /// Create a workflow row and put it at the top of the list
    pub fn create(
        &mut self,
        source: &mut dyn WorkflowSource,
        name: &str,
        description: &str,
        user_email: Option<&str>,
    ) -> Result<WorkflowSummary> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidWorkflow("name is required".to_string()));
        }

        let id = self.unused_id()?;
        let summary = WorkflowSummary {
            id,
            name: name.to_string(),
            last_edited_by: display_name(user_email.unwrap_or_default()),
            last_edited_on: Utc::now(),
            description: description.trim().to_string(),
            is_pinned: false,
        };
        let created = source.create_workflow(summary)?;
        log::info!("Created workflow '{}' ({})", created.name, created.id);
        self.rows.insert(0, created.clone());
        Ok(created)
    }

    fn unused_id(&self) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = random_workflow_id();
            if self.get(&id).is_none() {
                return Ok(id);
            }
        }
        Err(ServiceError::InvalidWorkflow(
            "no free workflow id available".to_string(),
        ))
    }
}

/// `#` followed by three random digits
///
/// The digits come from the random bits of a v4 UUID, the workspace's
/// existing random source.
fn random_workflow_id() -> String {
    format!("#{:03}", uuid::Uuid::new_v4().as_u128() % 1000)
}
