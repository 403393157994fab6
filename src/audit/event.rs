//! Audit event schema and types.
//!
//! Events hold identifiers and outcome metadata only, so they can be kept
//! and printed without leaking payload values or secrets.

use std::fmt;

use crate::notify::Notification;
use crate::outcome::ResultCode;

/// Kind of audit event being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventKind {
    /// Creation, modification or deletion of records
    StateChange,
    /// Authorization check that denied the request
    Authorization,
    /// Input rejected by validation or a store precondition
    InputRejected,
    /// External dependency failure
    Dependency,
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEventKind::StateChange => write!(f, "state_change"),
            AuditEventKind::Authorization => write!(f, "authorization"),
            AuditEventKind::InputRejected => write!(f, "input_rejected"),
            AuditEventKind::Dependency => write!(f, "dependency"),
        }
    }
}

/// Outcome of an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Operation succeeded
    Success,
    /// Operation was refused (validation, authorization, precondition)
    Denied,
    /// The actor backed out
    Cancelled,
    /// Operation failed due to an external error
    Error,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Success => write!(f, "success"),
            AuditOutcome::Denied => write!(f, "denied"),
            AuditOutcome::Cancelled => write!(f, "cancelled"),
            AuditOutcome::Error => write!(f, "error"),
        }
    }
}

/// A structured audit event containing only safe metadata.
///
/// # Example
///
/// ```
/// use usecase_core::audit::{AuditEvent, AuditEventKind, AuditOutcome};
///
/// let event = AuditEvent::new(
///     "req-123",
///     Some("op-1"),
///     AuditEventKind::StateChange,
///     AuditOutcome::Success,
/// )
/// .with_action("delete_banner")
/// .with_resource_id("4f1c2a10-0000-4000-8000-000000000000");
///
/// assert_eq!(event.request_id(), "req-123");
/// assert_eq!(event.action(), Some("delete_banner"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    request_id: String,
    principal: Option<String>,
    kind: AuditEventKind,
    outcome: AuditOutcome,
    action: Option<String>,
    resource_id: Option<String>,
}

impl AuditEvent {
    /// Creates a new audit event with required fields.
    pub fn new(
        request_id: impl Into<String>,
        principal: Option<impl Into<String>>,
        kind: AuditEventKind,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            principal: principal.map(Into::into),
            kind,
            outcome,
            action: None,
            resource_id: None,
        }
    }

    /// Builds the event describing a handler notification.
    pub fn from_notification(n: &Notification) -> Self {
        let (kind, outcome) = match n.outcome.code() {
            ResultCode::Success => (AuditEventKind::StateChange, AuditOutcome::Success),
            ResultCode::Unauthorized => (AuditEventKind::Authorization, AuditOutcome::Denied),
            ResultCode::ValidationFailed | ResultCode::NotFound | ResultCode::Duplicate => {
                (AuditEventKind::InputRejected, AuditOutcome::Denied)
            }
            ResultCode::Cancelled => (AuditEventKind::StateChange, AuditOutcome::Cancelled),
            ResultCode::ConnectionError => (AuditEventKind::Dependency, AuditOutcome::Error),
        };

        let event = Self::new(n.request_id.clone(), n.principal.clone(), kind, outcome)
            .with_action(n.operation);
        match n.outcome.record_id() {
            Some(id) => event.with_resource_id(id.to_string()),
            None => event,
        }
    }

    /// Sets the action being performed.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the resource identifier.
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the principal, if authenticated.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Returns the event kind.
    pub fn kind(&self) -> AuditEventKind {
        self.kind
    }

    /// Returns the operation outcome.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Returns the action, if set.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Returns the resource identifier, if set.
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuditEvent[kind={}, outcome={}, request_id={}, principal={}",
            self.kind,
            self.outcome,
            self.request_id,
            self.principal.as_deref().unwrap_or("<none>")
        )?;

        if let Some(action) = &self.action {
            write!(f, ", action={}", action)?;
        }
        if let Some(resource_id) = &self.resource_id {
            write!(f, ", resource_id={}", resource_id)?;
        }

        write!(f, "]")
    }
}
