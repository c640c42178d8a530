//! Server event notifications shown as transient toasts.
//!
//! # Responsibility
//! - Recognize the event names pushed by the server channel.
//! - Keep the list of visible toasts and expire them after a fixed delay.
//!
//! # Invariants
//! - Unknown event names and payloads without a message never produce a
//!   toast.
//! - A toast is visible for exactly `ttl` after it was posted unless it is
//!   dismissed earlier.
//! - Time is passed in by the caller; the queue never reads the clock.

pub mod toast;

pub use toast::{NotificationKind, Toast, ToastQueue, TOAST_TTL};
