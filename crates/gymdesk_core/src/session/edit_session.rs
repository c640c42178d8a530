//! In-memory attendance edit session.
//!
//! # Responsibility
//! - Build the initial status map from a roster and persisted records.
//! - Apply status/note edits before anything is submitted.
//! - Serialize the session into one submit batch.
//!
//! # Invariants
//! - Every roster subject has exactly one entry; non-roster ids never do.
//! - Roster order is preserved for display and batch serialization.
//! - Any effective mutation clears `saved` and bumps `revision`.

use crate::model::attendance::{
    AttendanceBatch, AttendanceEntry, AttendanceKey, AttendanceRecord, AttendanceStatus,
    BatchEntry, ClassStatus,
};
use crate::model::person::{Subject, SubjectId};
use log::{debug, warn};
use std::collections::HashMap;

/// Pending attendance edits for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession<S: AttendanceStatus> {
    order: Vec<SubjectId>,
    entries: HashMap<SubjectId, AttendanceEntry<S>>,
    saved: bool,
    revision: u64,
}

impl<S: AttendanceStatus> EditSession<S> {
    /// Builds the initial session for a roster.
    ///
    /// Every subject starts at `default_status` with an empty note, then each
    /// record overwrites its subject's entry. Records for subjects missing
    /// from the roster are ignored; duplicate records resolve last-write-wins.
    /// Both anomalies are logged.
    pub fn build(subjects: &[Subject], records: &[AttendanceRecord<S>], default_status: S) -> Self {
        let mut order = Vec::with_capacity(subjects.len());
        let mut entries = HashMap::with_capacity(subjects.len());
        for subject in subjects {
            if entries
                .insert(subject.id.clone(), AttendanceEntry::new(default_status))
                .is_some()
            {
                warn!(
                    "event=session_build module=session status=duplicate_subject subject_id={}",
                    subject.id
                );
                continue;
            }
            order.push(subject.id.clone());
        }

        let mut seen: HashMap<&SubjectId, usize> = HashMap::new();
        for record in records {
            let Some(entry) = entries.get_mut(&record.subject_id) else {
                warn!(
                    "event=session_build module=session status=unknown_subject subject_id={} key={}",
                    record.subject_id, record.key
                );
                continue;
            };
            let count = seen.entry(&record.subject_id).or_insert(0);
            *count += 1;
            if *count > 1 {
                warn!(
                    "event=session_build module=session status=duplicate_record subject_id={} key={} occurrence={}",
                    record.subject_id, record.key, count
                );
            }
            entry.status = record.status;
            entry.note = record.note.clone().unwrap_or_default();
        }

        Self {
            order,
            entries,
            saved: false,
            revision: 0,
        }
    }

    /// Builds a session with every subject at the positive status.
    pub fn all_present(subjects: &[Subject]) -> Self {
        Self::build(subjects, &[], S::PRESENT)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, subject_id: &SubjectId) -> bool {
        self.entries.contains_key(subject_id)
    }

    pub fn get(&self, subject_id: &SubjectId) -> Option<&AttendanceEntry<S>> {
        self.entries.get(subject_id)
    }

    /// Entries in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (&SubjectId, &AttendanceEntry<S>)> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| (id, entry)))
    }

    /// Whether the session was persisted and not edited since.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Monotonic mutation counter; unchanged by no-op edits.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces one subject's status, keeping its note.
    ///
    /// Returns `false` (and changes nothing) for ids outside the roster.
    pub fn set_status(&mut self, subject_id: &SubjectId, status: S) -> bool {
        let Some(entry) = self.entries.get_mut(subject_id) else {
            debug!(
                "event=session_edit module=session status=ignored op=set_status subject_id={subject_id}"
            );
            return false;
        };
        entry.status = status;
        self.touch();
        true
    }

    /// Replaces one subject's note. Content is free text.
    ///
    /// Returns `false` (and changes nothing) for ids outside the roster.
    pub fn set_note(&mut self, subject_id: &SubjectId, note: impl Into<String>) -> bool {
        let Some(entry) = self.entries.get_mut(subject_id) else {
            debug!(
                "event=session_edit module=session status=ignored op=set_note subject_id={subject_id}"
            );
            return false;
        };
        entry.note = note.into();
        self.touch();
        true
    }

    /// Sets every subject to the positive status and clears all notes.
    ///
    /// The entry map is rebuilt from the roster, not merged.
    pub fn mark_all_present(&mut self) {
        self.entries = self
            .order
            .iter()
            .map(|id| (id.clone(), AttendanceEntry::new(S::PRESENT)))
            .collect();
        self.touch();
    }

    /// Serializes entries, in roster order, into one batch for `key`.
    pub fn to_batch(&self, key: &AttendanceKey) -> AttendanceBatch<S> {
        AttendanceBatch {
            key: key.clone(),
            entries: self
                .iter()
                .map(|(id, entry)| BatchEntry {
                    subject_id: id.clone(),
                    status: entry.status,
                    note: entry.note.clone(),
                })
                .collect(),
        }
    }

    /// Marks the session persisted if no edit happened after `revision`.
    ///
    /// Returns whether the saved flag was set.
    pub(crate) fn mark_saved_at(&mut self, revision: u64) -> bool {
        if self.revision != revision {
            return false;
        }
        self.saved = true;
        true
    }

    pub(crate) fn mark_unsaved(&mut self) {
        self.saved = false;
    }

    fn touch(&mut self) {
        self.saved = false;
        self.revision += 1;
    }
}

impl EditSession<ClassStatus> {
    /// Flips one member between present and absent.
    pub fn toggle(&mut self, subject_id: &SubjectId) -> bool {
        let Some(current) = self.get(subject_id).map(|entry| entry.status) else {
            return false;
        };
        self.set_status(subject_id, current.toggled())
    }
}
