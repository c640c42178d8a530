//! JSON shapes exchanged with the attendance endpoints.

use crate::model::attendance::{
    AttendanceBatch, AttendanceKey, AttendanceRecord, AttendanceStatus, ClassStatus, StaffStatus,
};
use crate::model::person::SubjectId;
use crate::repo::attendance_store::{StoreError, StoreResult};
use log::warn;
use serde::{Deserialize, Serialize};

/// A reference that the API either leaves as an id or populates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SubjectRef {
    Id(String),
    Populated {
        #[serde(rename = "_id")]
        id: String,
    },
}

impl SubjectRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Populated { id } => id.as_str(),
        }
    }

    fn to_subject_id(&self) -> StoreResult<SubjectId> {
        SubjectId::new(self.id())
            .map_err(|_| StoreError::Decode("attendance record has an empty subject id".to_string()))
    }
}

/// Row of `GET /employee-attendance/date/{date}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffRecordWire {
    /// `None` when the server populated a reference to a deleted employee.
    #[serde(default)]
    pub employee: Option<SubjectRef>,
    pub status: StaffStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// Row of `GET /attendance/session/{classId}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassRecordWire {
    /// `None` when the server populated a reference to a deleted member.
    #[serde(default)]
    pub member: Option<SubjectRef>,
    pub status: ClassStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// A fetched attendance row that may have lost its subject.
pub trait RecordRow<S: AttendanceStatus> {
    /// Converts the row; `Ok(None)` when the subject reference is gone.
    fn into_record(self, key: &AttendanceKey) -> StoreResult<Option<AttendanceRecord<S>>>;
}

impl RecordRow<StaffStatus> for StaffRecordWire {
    fn into_record(self, key: &AttendanceKey) -> StoreResult<Option<AttendanceRecord<StaffStatus>>> {
        into_record(self.employee.as_ref(), self.status, self.note, key)
    }
}

impl RecordRow<ClassStatus> for ClassRecordWire {
    fn into_record(self, key: &AttendanceKey) -> StoreResult<Option<AttendanceRecord<ClassStatus>>> {
        into_record(self.member.as_ref(), self.status, self.note, key)
    }
}

fn into_record<S: AttendanceStatus>(
    subject: Option<&SubjectRef>,
    status: S,
    note: Option<String>,
    key: &AttendanceKey,
) -> StoreResult<Option<AttendanceRecord<S>>> {
    let Some(subject) = subject else {
        return Ok(None);
    };
    Ok(Some(AttendanceRecord {
        subject_id: subject.to_subject_id()?,
        key: key.clone(),
        status,
        note: note.filter(|note| !note.is_empty()),
    }))
}

/// Converts fetched rows, dropping rows whose subject no longer exists.
pub fn collect_records<S: AttendanceStatus, W: RecordRow<S>>(
    rows: Vec<W>,
    key: &AttendanceKey,
) -> StoreResult<Vec<AttendanceRecord<S>>> {
    let mut records = Vec::with_capacity(rows.len());
    let mut orphaned = 0usize;
    for row in rows {
        match row.into_record(key)? {
            Some(record) => records.push(record),
            None => orphaned += 1,
        }
    }
    if orphaned > 0 {
        warn!("event=record_decode module=api status=orphaned key={key} skipped={orphaned}");
    }
    Ok(records)
}

/// `data` of `POST /attendance/batch`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassBatchSummary {
    pub marked: usize,
    /// Per-entry failures reported by the server.
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

/// Records written by a staff submit: the echoed rows, or the batch size
/// when the server sent no `data`.
pub fn staff_persisted_count(saved: Option<Vec<serde_json::Value>>, batch_len: usize) -> usize {
    saved.map_or(batch_len, |rows| rows.len())
}

/// Records written by a class submit: `marked`, or the batch size when the
/// server sent no `data`.
pub fn class_persisted_count(summary: Option<ClassBatchSummary>, batch_len: usize) -> usize {
    match summary {
        Some(summary) => {
            if !summary.errors.is_empty() {
                warn!(
                    "event=attendance_submit module=api status=partial marked={} errors={}",
                    summary.marked,
                    summary.errors.len()
                );
            }
            summary.marked
        }
        None => batch_len,
    }
}

/// Body of `POST /employee-attendance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMarkRequest<'a> {
    pub date: String,
    pub attendance_data: Vec<StaffMarkEntry<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMarkEntry<'a> {
    pub employee_id: &'a str,
    pub status: StaffStatus,
    pub note: &'a str,
}

/// Body of `POST /attendance/batch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBatchRequest<'a> {
    pub session_id: &'a str,
    pub entries: Vec<ClassBatchEntry<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBatchEntry<'a> {
    pub member_id: &'a str,
    pub status: ClassStatus,
    pub note: &'a str,
}

impl<'a> StaffMarkRequest<'a> {
    pub fn from_batch(batch: &'a AttendanceBatch<StaffStatus>) -> StoreResult<Self> {
        if batch.key.as_date().is_none() {
            return Err(StoreError::UnsupportedKey(batch.key.clone()));
        }
        Ok(Self {
            date: batch.key.to_string(),
            attendance_data: batch
                .entries
                .iter()
                .map(|entry| StaffMarkEntry {
                    employee_id: entry.subject_id.as_str(),
                    status: entry.status,
                    note: entry.note.as_str(),
                })
                .collect(),
        })
    }
}

impl<'a> ClassBatchRequest<'a> {
    pub fn from_batch(batch: &'a AttendanceBatch<ClassStatus>) -> StoreResult<Self> {
        let session_id = batch
            .key
            .as_class_id()
            .ok_or_else(|| StoreError::UnsupportedKey(batch.key.clone()))?;
        Ok(Self {
            session_id,
            entries: batch
                .entries
                .iter()
                .map(|entry| ClassBatchEntry {
                    member_id: entry.subject_id.as_str(),
                    status: entry.status,
                    note: entry.note.as_str(),
                })
                .collect(),
        })
    }
}
