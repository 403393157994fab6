use std::fmt;
use std::sync::Arc;

use crate::outcome::OperationOutcome;
use crate::state::RequestState;

/// Error returned when a notification cannot be delivered.
///
/// The handler logs it and moves on; it never replaces the outcome of the
/// request that triggered the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError {
    message: String,
}

impl NotifyError {
    /// Creates a new notify error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification failed: {}", self.message)
    }
}

impl std::error::Error for NotifyError {}

/// What the handler reports after each request.
///
/// Contains identifiers and the outcome only, never payload values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Request the outcome belongs to
    pub request_id: String,
    /// Principal id, `None` for guests
    pub principal: Option<String>,
    /// Operation name, e.g. `submit_feedback`
    pub operation: &'static str,
    /// Outcome returned to the caller
    pub outcome: OperationOutcome,
    /// Terminal state the request ends in; a successful request enters
    /// `Notified` once this notification returns
    pub final_state: RequestState,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} by {} -> {} ({})",
            self.request_id,
            self.operation,
            self.principal.as_deref().unwrap_or("guest"),
            self.outcome,
            self.final_state
        )
    }
}

/// Side channel receiving every request outcome.
pub trait Notifier: Send + Sync {
    /// Delivers a notification.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if delivery fails.
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Notifier writing one structured `tracing` event per outcome.
///
/// Successes are logged at info level, every failure code at warn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: &Notification) -> Result<(), NotifyError> {
        if n.outcome.is_success() {
            tracing::info!(
                target: "usecase_notify",
                request_id = %n.request_id,
                principal = ?n.principal,
                operation = n.operation,
                code = %n.outcome.code(),
                record_id = ?n.outcome.record_id(),
                "{}",
                n.outcome.message()
            );
        } else {
            tracing::warn!(
                target: "usecase_notify",
                request_id = %n.request_id,
                principal = ?n.principal,
                operation = n.operation,
                code = %n.outcome.code(),
                state = %n.final_state,
                "{}",
                n.outcome.message()
            );
        }
        Ok(())
    }
}

/// Notifier forwarding to several notifiers in order.
///
/// Every notifier is called even if an earlier one fails; the first error
/// is returned.
#[derive(Default)]
pub struct FanoutNotifier {
    targets: Vec<Box<dyn Notifier>>,
}

impl FanoutNotifier {
    /// Creates an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a target notifier.
    pub fn with(mut self, notifier: impl Notifier + 'static) -> Self {
        self.targets.push(Box::new(notifier));
        self
    }
}

impl fmt::Debug for FanoutNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutNotifier")
            .field("targets", &self.targets.len())
            .finish()
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.targets
            .iter()
            .map(|t| t.notify(notification))
            .fold(Ok(()), |acc, r| acc.and(r))
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).notify(notification)
    }
}
