//! Attendance use-case service.
//!
//! # Responsibility
//! - Drive the attendance workflow against a record store for synchronous
//!   callers (CLI, bindings, tests).
//! - Surface load/submit failures as errors while the workflow keeps its
//!   own state consistent.
//!
//! # Invariants
//! - Every load and submit goes through a workflow ticket.
//! - A failed submit leaves session entries untouched.
//! - Service layer remains storage-agnostic.

use crate::model::attendance::{AttendanceKey, AttendanceStatus, ClassStatus};
use crate::model::person::SubjectId;
use crate::repo::attendance_store::{AttendanceStore, StoreError};
use crate::session::edit_session::EditSession;
use crate::session::summary::SummaryCounts;
use crate::session::workflow::{AttendanceWorkflow, LoadOutcome, SubmitOutcome, WorkflowError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for attendance use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Operation not allowed in the current workflow state.
    Workflow(WorkflowError),
    /// Record store failure.
    Store(StoreError),
}

impl ServiceError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Workflow(err) => err.to_string(),
            Self::Store(err) => err.user_message(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Workflow(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Workflow(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<WorkflowError> for ServiceError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Result of an accepted submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitReport {
    /// Records the store reports as written.
    pub persisted: usize,
    /// Whether the session is now marked saved.
    pub clean: bool,
}

/// Attendance screen facade over a record store.
pub struct AttendanceService<S: AttendanceStatus, R: AttendanceStore<S>> {
    store: R,
    workflow: AttendanceWorkflow<S>,
}

impl<S: AttendanceStatus, R: AttendanceStore<S>> AttendanceService<S, R> {
    /// Creates a service whose sessions default to the positive status.
    pub fn new(store: R) -> Self {
        Self::with_default_status(store, S::PRESENT)
    }

    pub fn with_default_status(store: R, default_status: S) -> Self {
        Self {
            store,
            workflow: AttendanceWorkflow::new(default_status),
        }
    }

    pub fn workflow(&self) -> &AttendanceWorkflow<S> {
        &self.workflow
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn session(&self) -> Option<&EditSession<S>> {
        self.workflow.session()
    }

    /// Switches to `key`, discarding any current session, and loads it.
    ///
    /// Returns the number of subjects in the new session.
    pub fn select(&mut self, key: AttendanceKey) -> Result<usize, ServiceError> {
        let ticket = self.workflow.begin_load(key);
        let result = self.store.load_roster(ticket.key());
        match self.workflow.complete_load(ticket, result) {
            LoadOutcome::Ready { subjects } => Ok(subjects),
            LoadOutcome::Failed(err) => Err(err.into()),
            LoadOutcome::Stale => Err(WorkflowError::NotReady.into()),
        }
    }

    /// Reloads the active key from the store.
    pub fn reload(&mut self) -> Result<usize, ServiceError> {
        let key = self.workflow.key().cloned().ok_or(WorkflowError::NotReady)?;
        self.select(key)
    }

    /// Moves a date key by whole days and loads the new date.
    pub fn shift_date(&mut self, days: i64) -> Result<usize, ServiceError> {
        let key = self
            .workflow
            .key()
            .filter(|key| key.as_date().is_some())
            .map(|key| key.shifted(days))
            .ok_or(WorkflowError::NotReady)?;
        self.select(key)
    }

    /// Replaces one subject's status. Unknown subjects are ignored.
    pub fn set_status(&mut self, subject_id: &SubjectId, status: S) -> bool {
        self.workflow
            .session_mut()
            .is_some_and(|session| session.set_status(subject_id, status))
    }

    /// Replaces one subject's note. Unknown subjects are ignored.
    pub fn set_note(&mut self, subject_id: &SubjectId, note: impl Into<String>) -> bool {
        self.workflow
            .session_mut()
            .is_some_and(|session| session.set_note(subject_id, note))
    }

    /// Marks everyone present. Returns `false` when nothing is loaded.
    pub fn mark_all_present(&mut self) -> bool {
        match self.workflow.session_mut() {
            Some(session) => {
                session.mark_all_present();
                true
            }
            None => false,
        }
    }

    pub fn summary(&self) -> Option<SummaryCounts<S>> {
        self.workflow.session().map(EditSession::summary)
    }

    /// Persists the current session as one batch.
    ///
    /// # Errors
    /// - `Workflow(NotReady)` when nothing is loaded.
    /// - `Store(..)` when the store rejects the batch; edits are kept.
    pub fn submit(&mut self) -> Result<SubmitReport, ServiceError> {
        let (ticket, batch) = self.workflow.begin_submit()?;
        let result = self.store.submit_batch(&batch);
        match self.workflow.complete_submit(ticket, result) {
            SubmitOutcome::Saved { persisted, clean } => Ok(SubmitReport { persisted, clean }),
            SubmitOutcome::Failed(err) => Err(err.into()),
            SubmitOutcome::Stale => Err(WorkflowError::NotReady.into()),
        }
    }
}

impl<R: AttendanceStore<ClassStatus>> AttendanceService<ClassStatus, R> {
    /// Flips one member between present and absent.
    pub fn toggle(&mut self, subject_id: &SubjectId) -> bool {
        self.workflow
            .session_mut()
            .is_some_and(|session| session.toggle(subject_id))
    }
}
