//! Record store contract for attendance-taking.
//!
//! # Responsibility
//! - Define what the attendance workflow needs from persistence: a roster,
//!   the records already stored for a key, and a batch write.
//! - Give every store implementation one error vocabulary.
//!
//! # Invariants
//! - `submit_batch` writes all entries of one key; per (subject, key) the
//!   stored record is the latest write.
//! - Stores never invent subjects: records only reference ids they were given
//!   or already held.

use crate::db::DbError;
use crate::model::attendance::{AttendanceBatch, AttendanceKey, AttendanceRecord, AttendanceStatus};
use crate::model::person::Subject;
use crate::session::workflow::LoadedRoster;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Message used when the store fails without explaining why.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred";

/// Failure talking to, or reported by, a record store.
#[derive(Debug)]
pub enum StoreError {
    /// Request never produced a response (connect, timeout, TLS).
    Transport(String),
    /// Non-2xx response.
    Status { code: u16, message: String },
    /// 2xx response whose envelope said `success: false`.
    Rejected(String),
    /// Response body did not match the expected shape.
    Decode(String),
    /// Key kind not served by this store (e.g. a class key on a staff store).
    UnsupportedKey(AttendanceKey),
    /// Local database failure.
    Db(DbError),
    /// Persisted data is not valid domain data.
    InvalidData(String),
}

impl StoreError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "request failed: {message}"),
            Self::Status { code, message } => write!(f, "server returned {code}: {message}"),
            Self::Rejected(message) => write!(f, "request rejected: {message}"),
            Self::Decode(message) => write!(f, "unexpected response: {message}"),
            Self::UnsupportedKey(key) => write!(f, "attendance key `{key}` is not supported here"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored attendance data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence operations the attendance workflow depends on.
pub trait AttendanceStore<S: AttendanceStatus> {
    /// Everyone whose attendance is taken under `key`.
    fn load_subjects(&self, key: &AttendanceKey) -> StoreResult<Vec<Subject>>;

    /// Records already persisted for `key`. May be partial or empty.
    fn load_records(&self, key: &AttendanceKey) -> StoreResult<Vec<AttendanceRecord<S>>>;

    /// Persists a whole batch; returns the number of records written.
    fn submit_batch(&self, batch: &AttendanceBatch<S>) -> StoreResult<usize>;

    /// Fetches roster and records together; fails if either fails.
    fn load_roster(&self, key: &AttendanceKey) -> StoreResult<LoadedRoster<S>> {
        let subjects = self.load_subjects(key)?;
        let records = self.load_records(key)?;
        Ok(LoadedRoster { subjects, records })
    }
}

impl<S: AttendanceStatus, T: AttendanceStore<S> + ?Sized> AttendanceStore<S> for &T {
    fn load_subjects(&self, key: &AttendanceKey) -> StoreResult<Vec<Subject>> {
        (**self).load_subjects(key)
    }

    fn load_records(&self, key: &AttendanceKey) -> StoreResult<Vec<AttendanceRecord<S>>> {
        (**self).load_records(key)
    }

    fn submit_batch(&self, batch: &AttendanceBatch<S>) -> StoreResult<usize> {
        (**self).submit_batch(batch)
    }
}
