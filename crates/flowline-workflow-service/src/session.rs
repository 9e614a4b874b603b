//! Editing one workflow on behalf of the logged-in user

use std::sync::Arc;

use flowline_editor::{
    CanvasController, CanvasView, EditorConfig, EventSink, NodeIdSource, NodeSequenceStore,
    NullEventSink, TimestampIdSource, ViewIntent, WorkflowEditorView, WorkflowPayload,
};

use crate::auth::{CurrentUser, UserProvider};
use crate::error::{Result, ServiceError};
use crate::workflow::{WorkflowId, WorkflowSource};

/// An open editor over a single workflow
pub struct EditorSession {
    workflow_id: WorkflowId,
    user: CurrentUser,
    canvas: CanvasController,
    view: WorkflowEditorView,
}

impl EditorSession {
    /// Open a workflow, hydrating its saved chain or seeding `[start, end]`
    pub fn open(
        source: &dyn WorkflowSource,
        users: &dyn UserProvider,
        workflow_id: &str,
        config: &EditorConfig,
    ) -> Result<Self> {
        Self::open_with(
            source,
            users,
            workflow_id,
            config,
            Box::new(TimestampIdSource::new()),
            Arc::new(NullEventSink),
        )
    }

    /// Open with an explicit node id source and event sink
    pub fn open_with(
        source: &dyn WorkflowSource,
        users: &dyn UserProvider,
        workflow_id: &str,
        config: &EditorConfig,
        ids: Box<dyn NodeIdSource>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let user = users.current_user().ok_or(ServiceError::NotAuthenticated)?;

        let store = match source.get_payload(workflow_id)? {
            Some(payload) => {
                log::debug!(
                    "Hydrating workflow '{}' with {} nodes",
                    workflow_id,
                    payload.nodes.len()
                );
                NodeSequenceStore::from_payload(&payload, config, ids)?
            }
            None => {
                log::debug!("Workflow '{}' has no saved chain, seeding", workflow_id);
                NodeSequenceStore::with_id_source(config, ids)
            }
        };

        log::info!("User '{}' opened workflow '{}'", user.email, workflow_id);
        Ok(Self {
            workflow_id: workflow_id.to_string(),
            user,
            canvas: CanvasController::with_store(store, config, events),
            view: WorkflowEditorView::new(),
        })
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn canvas(&self) -> &CanvasController {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut CanvasController {
        &mut self.canvas
    }

    pub fn view(&self) -> &WorkflowEditorView {
        &self.view
    }

    /// Route a user intent through the view
    pub fn dispatch(&mut self, intent: ViewIntent) -> bool {
        self.view.dispatch(intent, &mut self.canvas)
    }

    pub fn render(&self) -> CanvasView {
        self.view.render(&self.canvas)
    }

    /// Persist the live chain and stamp the workflow as edited by this user
    pub fn save(&self, source: &mut dyn WorkflowSource) -> Result<WorkflowPayload> {
        let payload = self.canvas.store().to_payload();
        source.save_workflow(&self.workflow_id, &payload)?;
        source.mark_edited(
            &self.workflow_id,
            &self.user.display_name(),
            payload.last_edited_on,
        )?;
        log::info!(
            "Saved workflow '{}' ({} nodes)",
            self.workflow_id,
            payload.nodes.len()
        );
        Ok(payload)
    }

    /// Close the session, keeping the chain as a payload
    pub fn into_payload(self) -> WorkflowPayload {
        self.canvas.into_store().to_payload()
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("workflow_id", &self.workflow_id)
            .field("user", &self.user)
            .field("nodes", &self.canvas.sequence().len())
            .finish()
    }
}
