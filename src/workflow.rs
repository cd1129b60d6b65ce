// CRUD workflow controller
//
// Owns the transient dialog state of the locations screen: the create/edit
// form and the delete confirmation. The two workflows are independent state
// machines. Only `confirm_delete` touches the store.

use crate::entities::Location;
use crate::error::StoreError;
use crate::store::LocationStore;

pub const ADD_LOCATION_TITLE: &str = "Add Location";
pub const EDIT_LOCATION_TITLE: &str = "Edit Location";
pub const DELETE_LOCATION_TITLE: &str = "Delete Location";
pub const DELETE_LOCATION_MESSAGE: &str =
    "Are you sure you want to delete this location? This action cannot be undone.";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormState {
    #[default]
    Closed,
    OpenForCreate,
    OpenForEdit(Location),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeleteState {
    #[default]
    Idle,
    PendingConfirm(String),
}

/// What happened when a pending delete was confirmed
#[derive(Debug)]
pub enum DeleteOutcome {
    /// Confirm pressed with no pending target
    NothingPending,
    Deleted(String),
    /// The store rejected the delete; the dialog is closed anyway
    Failed { id: String, error: StoreError },
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CrudWorkflowController {
    form: FormState,
    delete: DeleteState,
}

impl CrudWorkflowController {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // FORM WORKFLOW
    // ========================================================================

    /// "Add" action: open the form with no target
    pub fn open_create(&mut self) {
        self.form = FormState::OpenForCreate;
    }

    /// "Edit" action: open the form on `location`
    pub fn open_edit(&mut self, location: Location) {
        self.form = FormState::OpenForEdit(location);
    }

    /// Cancel or explicit close. Clears the edit target.
    pub fn close_form(&mut self) {
        self.form = FormState::Closed;
    }

    /// Completion callback for the form collaborator after a successful save
    pub fn on_save_completed(&mut self) {
        self.close_form();
    }

    pub fn form_state(&self) -> &FormState {
        &self.form
    }

    pub fn is_form_open(&self) -> bool {
        !matches!(self.form, FormState::Closed)
    }

    pub fn form_target(&self) -> Option<&Location> {
        match &self.form {
            FormState::OpenForEdit(location) => Some(location),
            _ => None,
        }
    }

    pub fn form_title(&self) -> &'static str {
        match self.form {
            FormState::OpenForEdit(_) => EDIT_LOCATION_TITLE,
            _ => ADD_LOCATION_TITLE,
        }
    }

    // ========================================================================
    // DELETE-CONFIRMATION WORKFLOW
    // ========================================================================

    /// "Delete" action on a row: ask for confirmation first
    pub fn request_delete(&mut self, id: impl Into<String>) {
        self.delete = DeleteState::PendingConfirm(id.into());
    }

    /// Drop the pending delete without touching the store
    pub fn cancel_delete(&mut self) {
        self.delete = DeleteState::Idle;
    }

    /// Delete the pending target through `store`, then return to `Idle`.
    ///
    /// Store failures are logged and reported in the outcome, never
    /// propagated: a stale id looks the same to the user as a fresh delete.
    pub fn confirm_delete<S>(&mut self, store: &S) -> DeleteOutcome
    where
        S: LocationStore + ?Sized,
    {
        let id = match std::mem::take(&mut self.delete) {
            DeleteState::PendingConfirm(id) => id,
            DeleteState::Idle => return DeleteOutcome::NothingPending,
        };

        match store.delete_location(&id) {
            Ok(()) => DeleteOutcome::Deleted(id),
            Err(error) => {
                tracing::warn!(location_id = %id, error = %error, "delete failed, closing dialog");
                DeleteOutcome::Failed { id, error }
            }
        }
    }

    pub fn delete_state(&self) -> &DeleteState {
        &self.delete
    }

    pub fn is_confirm_open(&self) -> bool {
        matches!(self.delete, DeleteState::PendingConfirm(_))
    }

    pub fn delete_target(&self) -> Option<&str> {
        match &self.delete {
            DeleteState::PendingConfirm(id) => Some(id),
            DeleteState::Idle => None,
        }
    }
}
