//! Record store contracts and implementations.
//!
//! # Responsibility
//! - Define the persistence contract the attendance workflow depends on.
//! - Provide a local SQLite implementation of it.
//!
//! # Invariants
//! - Store APIs return semantic errors (`Rejected`, `UnsupportedKey`) in
//!   addition to transport and database errors.
//!
//! # See also
//! - `crate::api` for the REST-backed implementation.

pub mod attendance_store;
pub mod sqlite_store;
