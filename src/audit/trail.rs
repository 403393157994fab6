//! In-memory audit trail recorder.

use parking_lot::Mutex;

use super::AuditEvent;
use crate::notify::{Notification, Notifier, NotifyError};

/// Thread-safe in-memory recorder for audit events.
///
/// As a [`Notifier`], it turns every handler notification into one
/// [`AuditEvent`], keeping the audit copy of requests that deleted or
/// changed records.
///
/// # Example
///
/// ```
/// use usecase_core::audit::{AuditTrail, AuditEvent, AuditEventKind, AuditOutcome};
///
/// let trail = AuditTrail::new();
///
/// trail.record(AuditEvent::new(
///     "req-123",
///     Some("admin"),
///     AuditEventKind::StateChange,
///     AuditOutcome::Success,
/// ));
///
/// assert_eq!(trail.events().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AuditTrail {
    events: Mutex<Vec<AuditEvent>>,
}

impl AuditTrail {
    /// Creates a new empty audit trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an audit event.
    ///
    /// Events are stored in the order they are recorded.
    pub fn record(&self, event: AuditEvent) {
        tracing::info!(
            target: "usecase_audit",
            request_id = %event.request_id(),
            principal = ?event.principal(),
            kind = %event.kind(),
            outcome = %event.outcome(),
            action = ?event.action(),
            resource_id = ?event.resource_id(),
            "audit event"
        );
        self.events.lock().push(event);
    }

    /// Returns a snapshot of all recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Returns the events about one resource, in recording order.
    pub fn events_for(&self, resource_id: &str) -> Vec<AuditEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.resource_id() == Some(resource_id))
            .cloned()
            .collect()
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Notifier for AuditTrail {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.record(AuditEvent::from_notification(notification));
        Ok(())
    }
}
