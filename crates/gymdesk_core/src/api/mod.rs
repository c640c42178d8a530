//! Client side of the gym REST API.
//!
//! # Responsibility
//! - Decode the shared response envelope.
//! - Map attendance endpoints onto the `AttendanceStore` contract.
//!
//! # Invariants
//! - Transport details (URLs, headers, JSON field names) stay inside this
//!   module.

pub mod envelope;
pub mod http_store;
pub mod wire;
