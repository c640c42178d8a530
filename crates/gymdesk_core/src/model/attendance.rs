//! Attendance statuses, keys, records and batches.
//!
//! # Responsibility
//! - Define the closed status enums for staff and class attendance.
//! - Define the key that scopes one attendance-taking session.
//! - Define persisted records and the batch shape sent on submit.
//!
//! # Invariants
//! - Each status enum has exactly one positive value (`PRESENT`).
//! - `all()` lists every value once, in display order.
//! - One persisted record exists per (subject, key); later writes overwrite.

use crate::model::person::SubjectId;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

/// Wire format for date keys.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Common behavior of attendance status enums.
pub trait AttendanceStatus: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// The positive value used for defaults and bulk "mark all present".
    const PRESENT: Self;

    /// Every value, in display order.
    fn all() -> &'static [Self];

    /// Stable wire text.
    fn as_str(self) -> &'static str;

    /// Parses stable wire text.
    fn parse(value: &str) -> Option<Self>;

    fn is_present(self) -> bool {
        self == Self::PRESENT
    }
}

/// Daily staff attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StaffStatus {
    Present,
    #[serde(rename = "On Permission")]
    OnPermission,
    Absent,
}

const STAFF_STATUSES: &[StaffStatus] = &[
    StaffStatus::Present,
    StaffStatus::OnPermission,
    StaffStatus::Absent,
];

impl AttendanceStatus for StaffStatus {
    const PRESENT: Self = Self::Present;

    fn all() -> &'static [Self] {
        STAFF_STATUSES
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::OnPermission => "On Permission",
            Self::Absent => "Absent",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "Present" => Some(Self::Present),
            "On Permission" => Some(Self::OnPermission),
            "Absent" => Some(Self::Absent),
            _ => None,
        }
    }
}

/// Per-class member attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    #[serde(alias = "Present")]
    Present,
    #[serde(alias = "Absent")]
    Absent,
}

const CLASS_STATUSES: &[ClassStatus] = &[ClassStatus::Present, ClassStatus::Absent];

impl ClassStatus {
    /// Flips present and absent.
    pub fn toggled(self) -> Self {
        match self {
            Self::Present => Self::Absent,
            Self::Absent => Self::Present,
        }
    }
}

impl AttendanceStatus for ClassStatus {
    const PRESENT: Self = Self::Present;

    fn all() -> &'static [Self] {
        CLASS_STATUSES
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            _ => None,
        }
    }
}

/// Rejected key input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    InvalidDate(String),
    EmptyClassId,
}

impl Display for KeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(value) => {
                write!(f, "invalid attendance date `{value}`; expected YYYY-MM-DD")
            }
            Self::EmptyClassId => write!(f, "class id must not be empty"),
        }
    }
}

impl Error for KeyError {}

/// Scope of one attendance-taking session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttendanceKey {
    /// Staff attendance for one calendar day.
    Date(NaiveDate),
    /// Member attendance for one scheduled class.
    Class(String),
}

impl AttendanceKey {
    /// Parses a `YYYY-MM-DD` date key.
    pub fn date(value: &str) -> Result<Self, KeyError> {
        let trimmed = value.trim();
        NaiveDate::parse_from_str(trimmed, DATE_KEY_FORMAT)
            .map(Self::Date)
            .map_err(|_| KeyError::InvalidDate(trimmed.to_string()))
    }

    /// Builds a class key from a non-empty class id.
    pub fn class(id: impl Into<String>) -> Result<Self, KeyError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(KeyError::EmptyClassId);
        }
        Ok(Self::Class(trimmed.to_string()))
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Class(_) => None,
        }
    }

    pub fn as_class_id(&self) -> Option<&str> {
        match self {
            Self::Date(_) => None,
            Self::Class(id) => Some(id.as_str()),
        }
    }

    /// Moves a date key by whole days; class keys are returned unchanged.
    pub fn shifted(&self, days: i64) -> Self {
        match self {
            Self::Date(date) => date
                .checked_add_signed(Duration::days(days))
                .map_or_else(|| self.clone(), Self::Date),
            Self::Class(_) => self.clone(),
        }
    }
}

impl Display for AttendanceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format(DATE_KEY_FORMAT)),
            Self::Class(id) => f.write_str(id),
        }
    }
}

/// One persisted attendance record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord<S: AttendanceStatus> {
    pub subject_id: SubjectId,
    pub key: AttendanceKey,
    pub status: S,
    pub note: Option<String>,
}

impl<S: AttendanceStatus> AttendanceRecord<S> {
    pub fn new(subject_id: SubjectId, key: AttendanceKey, status: S) -> Self {
        Self {
            subject_id,
            key,
            status,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// In-session state of one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry<S: AttendanceStatus> {
    pub status: S,
    /// Free text; empty when no note was given.
    pub note: String,
}

impl<S: AttendanceStatus> AttendanceEntry<S> {
    pub fn new(status: S) -> Self {
        Self {
            status,
            note: String::new(),
        }
    }
}

/// One line of a batch submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry<S: AttendanceStatus> {
    pub subject_id: SubjectId,
    pub status: S,
    pub note: String,
}

/// All entries of one session, persisted with a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceBatch<S: AttendanceStatus> {
    pub key: AttendanceKey,
    pub entries: Vec<BatchEntry<S>>,
}

impl<S: AttendanceStatus> AttendanceBatch<S> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
