//! Attendance edit sessions and their lifecycle.
//!
//! # Responsibility
//! - Hold pending attendance edits independently of any rendering layer.
//! - Derive summary counts and rates from those edits.
//! - Sequence loads and submits so stale responses never win.
//!
//! # Invariants
//! - Sessions are plain values; every transition goes through `&mut self`.
//! - Summaries are pure functions of the session.

pub mod edit_session;
pub mod summary;
pub mod workflow;
