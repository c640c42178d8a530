//! Domain model for attendance-taking.
//!
//! # Responsibility
//! - Define the people whose attendance is recorded and the records kept
//!   about them.
//! - Keep wire shapes (as served by the REST API) separate from the common
//!   `Subject` projection used by the session logic.
//!
//! # Invariants
//! - Every subject is identified by a non-empty `SubjectId`.
//! - Attendance statuses are closed enums with one positive value.

pub mod attendance;
pub mod person;
