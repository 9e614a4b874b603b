//! Flowline Workflow Service - catalog, accounts and editor sessions
//!
//! Host-agnostic services around the editing core:
//!
//! - `WorkflowSource` / `WorkflowRepository`: where workflow rows and saved
//!   chains live
//! - `WorkflowCatalog`: the list view state (search, pins, pages)
//! - `AuthService`: email/password login over `CredentialStore`s
//! - `EditorSession`: one workflow opened in the editor by the current user

pub mod auth;
pub mod catalog;
pub mod credentials;
pub mod error;
pub mod repository;
pub mod session;
pub mod workflow;

pub use auth::{display_name, AuthService, CurrentUser, UserProvider};
pub use catalog::{PinChange, WorkflowCatalog, DEFAULT_PAGE_SIZE};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{AuthError, Result, ServiceError};
pub use repository::{WorkflowRecord, WorkflowRepository};
pub use session::EditorSession;
pub use workflow::{format_edited_on, WorkflowId, WorkflowSource, WorkflowSummary};
