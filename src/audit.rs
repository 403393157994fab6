//! Audit trail of handled requests.
//!
//! This module provides:
//! - `AuditEvent`: safe, structured record of one request outcome
//! - `AuditTrail`: in-memory recorder that doubles as a [`Notifier`](crate::Notifier)
//!
//! Events never store field values or secrets, only identifiers,
//! the operation name and the outcome category.

mod event;
mod trail;

pub use event::{AuditEvent, AuditEventKind, AuditOutcome};
pub use trail::AuditTrail;
