//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls and workflow transitions into use-case APIs.
//! - Keep UI/binding layers decoupled from storage details.

pub mod attendance_service;
