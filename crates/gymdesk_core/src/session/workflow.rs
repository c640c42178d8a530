//! Key-change / load / submit lifecycle for one attendance screen.
//!
//! # Responsibility
//! - Track which key is active and whether its session is loading, editable,
//!   being submitted, or failed to load.
//! - Hand out tickets for loads and submits so late results can be told
//!   apart from current ones.
//!
//! # Invariants
//! - Only the most recently issued ticket may change state; older results
//!   are discarded.
//! - A key change discards the current session unconditionally.
//! - At most one submit is in flight.
//! - A failed load ends in `Failed`, never stays in `Loading`.

use crate::model::attendance::{AttendanceBatch, AttendanceKey, AttendanceRecord, AttendanceStatus};
use crate::model::person::Subject;
use crate::repo::attendance_store::{StoreError, StoreResult};
use crate::session::edit_session::EditSession;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Roster plus existing records fetched for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRoster<S: AttendanceStatus> {
    pub subjects: Vec<Subject>,
    pub records: Vec<AttendanceRecord<S>>,
}

/// Proof of which load request a result belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    key: AttendanceKey,
    epoch: u64,
}

impl LoadTicket {
    pub fn key(&self) -> &AttendanceKey {
        &self.key
    }
}

/// Proof of which submit request a result belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    key: AttendanceKey,
    epoch: u64,
    revision: u64,
}

impl SubmitTicket {
    pub fn key(&self) -> &AttendanceKey {
        &self.key
    }
}

/// Current lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState<S: AttendanceStatus> {
    Idle,
    Loading {
        key: AttendanceKey,
    },
    Ready {
        key: AttendanceKey,
        session: EditSession<S>,
    },
    Submitting {
        key: AttendanceKey,
        session: EditSession<S>,
    },
    Failed {
        key: AttendanceKey,
        message: String,
    },
}

/// Rejected workflow transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// No editable session exists (idle, loading, or failed).
    NotReady,
    /// A submit for this session has not completed yet.
    SubmitInFlight,
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "attendance session is not ready"),
            Self::SubmitInFlight => write!(f, "attendance submit already in progress"),
        }
    }
}

impl Error for WorkflowError {}

/// Result of applying a load response.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Session built with this many subjects.
    Ready { subjects: usize },
    /// Fetch failed; the workflow is now `Failed`.
    Failed(StoreError),
    /// A newer load was issued; the response was dropped.
    Stale,
}

/// Result of applying a submit response.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Store accepted the batch.
    ///
    /// `clean` is false when the session was edited while the submit was in
    /// flight, so those edits are still unsaved.
    Saved { persisted: usize, clean: bool },
    /// Store rejected the batch; session entries are unchanged.
    Failed(StoreError),
    /// The key changed while the submit was in flight.
    Stale,
}

/// Attendance screen state machine.
#[derive(Debug, Clone)]
pub struct AttendanceWorkflow<S: AttendanceStatus> {
    state: WorkflowState<S>,
    epoch: u64,
    default_status: S,
}

impl<S: AttendanceStatus> Default for AttendanceWorkflow<S> {
    fn default() -> Self {
        Self::new(S::PRESENT)
    }
}

impl<S: AttendanceStatus> AttendanceWorkflow<S> {
    /// Creates an idle workflow; loaded subjects start at `default_status`.
    pub fn new(default_status: S) -> Self {
        Self {
            state: WorkflowState::Idle,
            epoch: 0,
            default_status,
        }
    }

    pub fn state(&self) -> &WorkflowState<S> {
        &self.state
    }

    /// Active key, if any load was ever issued.
    pub fn key(&self) -> Option<&AttendanceKey> {
        match &self.state {
            WorkflowState::Idle => None,
            WorkflowState::Loading { key }
            | WorkflowState::Ready { key, .. }
            | WorkflowState::Submitting { key, .. }
            | WorkflowState::Failed { key, .. } => Some(key),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, WorkflowState::Loading { .. })
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, WorkflowState::Submitting { .. })
    }

    /// Load error text while in `Failed`.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&EditSession<S>> {
        match &self.state {
            WorkflowState::Ready { session, .. } | WorkflowState::Submitting { session, .. } => {
                Some(session)
            }
            _ => None,
        }
    }

    /// Editable session. Edits stay allowed while a submit is in flight.
    pub fn session_mut(&mut self) -> Option<&mut EditSession<S>> {
        match &mut self.state {
            WorkflowState::Ready { session, .. } | WorkflowState::Submitting { session, .. } => {
                Some(session)
            }
            _ => None,
        }
    }

    /// Switches to `key` and starts loading it.
    ///
    /// Any session for the previous key is dropped, saved or not.
    pub fn begin_load(&mut self, key: AttendanceKey) -> LoadTicket {
        if let Some(session) = self.session() {
            if !session.is_saved() && session.revision() > 0 {
                info!(
                    "event=session_discard module=workflow status=unsaved key={} revision={}",
                    self.key().map(ToString::to_string).unwrap_or_default(),
                    session.revision()
                );
            }
        }

        self.epoch += 1;
        debug!(
            "event=load_begin module=workflow status=start key={key} epoch={}",
            self.epoch
        );
        self.state = WorkflowState::Loading { key: key.clone() };
        LoadTicket {
            key,
            epoch: self.epoch,
        }
    }

    /// Reloads the active key. Returns `None` when idle.
    pub fn reload(&mut self) -> Option<LoadTicket> {
        let key = self.key()?.clone();
        Some(self.begin_load(key))
    }

    /// Applies a load response.
    ///
    /// Responses for anything but the latest ticket are dropped.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: StoreResult<LoadedRoster<S>>,
    ) -> LoadOutcome {
        if ticket.epoch != self.epoch || !self.is_loading() {
            debug!(
                "event=load_complete module=workflow status=stale key={} epoch={} current_epoch={}",
                ticket.key, ticket.epoch, self.epoch
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(roster) => {
                let session = EditSession::build(&roster.subjects, &roster.records, self.default_status);
                let subjects = session.len();
                info!(
                    "event=load_complete module=workflow status=ok key={} subjects={} records={}",
                    ticket.key,
                    subjects,
                    roster.records.len()
                );
                self.state = WorkflowState::Ready {
                    key: ticket.key,
                    session,
                };
                LoadOutcome::Ready { subjects }
            }
            Err(err) => {
                warn!(
                    "event=load_complete module=workflow status=error key={} error={}",
                    ticket.key, err
                );
                self.state = WorkflowState::Failed {
                    key: ticket.key,
                    message: err.to_string(),
                };
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Starts a submit of the current session.
    ///
    /// # Errors
    /// - `SubmitInFlight` while a previous submit has not completed.
    /// - `NotReady` when there is no loaded session.
    pub fn begin_submit(&mut self) -> Result<(SubmitTicket, AttendanceBatch<S>), WorkflowError> {
        let state = std::mem::replace(&mut self.state, WorkflowState::Idle);
        match state {
            WorkflowState::Ready { key, session } => {
                let batch = session.to_batch(&key);
                let ticket = SubmitTicket {
                    key: key.clone(),
                    epoch: self.epoch,
                    revision: session.revision(),
                };
                debug!(
                    "event=submit_begin module=workflow status=start key={key} entries={}",
                    batch.len()
                );
                self.state = WorkflowState::Submitting { key, session };
                Ok((ticket, batch))
            }
            WorkflowState::Submitting { key, session } => {
                self.state = WorkflowState::Submitting { key, session };
                Err(WorkflowError::SubmitInFlight)
            }
            other => {
                self.state = other;
                Err(WorkflowError::NotReady)
            }
        }
    }

    /// Applies a submit response.
    ///
    /// On failure the session entries stay exactly as they were and the
    /// saved flag is cleared, so the user can retry.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: StoreResult<usize>,
    ) -> SubmitOutcome {
        if ticket.epoch != self.epoch || !self.is_submitting() {
            debug!(
                "event=submit_complete module=workflow status=stale key={} epoch={} current_epoch={}",
                ticket.key, ticket.epoch, self.epoch
            );
            return SubmitOutcome::Stale;
        }

        let state = std::mem::replace(&mut self.state, WorkflowState::Idle);
        let WorkflowState::Submitting { key, mut session } = state else {
            self.state = state;
            return SubmitOutcome::Stale;
        };

        let outcome = match result {
            Ok(persisted) => {
                let clean = session.mark_saved_at(ticket.revision);
                info!(
                    "event=submit_complete module=workflow status=ok key={key} persisted={persisted} clean={clean}"
                );
                SubmitOutcome::Saved { persisted, clean }
            }
            Err(err) => {
                session.mark_unsaved();
                warn!(
                    "event=submit_complete module=workflow status=error key={key} error={err}"
                );
                SubmitOutcome::Failed(err)
            }
        };
        self.state = WorkflowState::Ready { key, session };
        outcome
    }
}
