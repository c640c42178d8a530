//! Core attendance logic for the gym front desk.
//! This crate owns the attendance-taking invariants; UI layers only render
//! what it exposes.

pub mod api;
pub mod config;
pub mod db;
pub mod filter;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod session;

pub use api::http_store::HttpAttendanceStore;
pub use config::{ClientConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attendance::{
    AttendanceBatch, AttendanceEntry, AttendanceKey, AttendanceRecord, AttendanceStatus,
    BatchEntry, ClassStatus, KeyError, StaffStatus,
};
pub use model::person::{Employee, Member, Subject, SubjectId};
pub use notify::{NotificationKind, Toast, ToastQueue};
pub use repo::attendance_store::{AttendanceStore, StoreError, StoreResult};
pub use repo::sqlite_store::SqliteAttendanceStore;
pub use service::attendance_service::{AttendanceService, ServiceError, SubmitReport};
pub use session::edit_session::EditSession;
pub use session::summary::{AttendanceRate, SummaryCounts};
pub use session::workflow::{
    AttendanceWorkflow, LoadOutcome, LoadedRoster, SubmitOutcome, WorkflowError, WorkflowState,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
