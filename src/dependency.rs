//! External dependency seam.
//!
//! The handler calls an [`ExternalDependency`] right before it mutates the
//! store, so a failing dependency never leaves partial state behind.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

/// Error reported by an external dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyError {
    message: String,
}

impl DependencyError {
    /// Creates a new dependency error.
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

impl fmt::Display for DependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "external dependency failed: {}", self.message)
    }
}

impl std::error::Error for DependencyError {}

/// A network or database call the handler must complete before persisting.
pub trait ExternalDependency: Send + Sync {
    /// Performs the call for `operation`.
    ///
    /// # Errors
    ///
    /// Returns `DependencyError` if the remote side is unavailable.
    fn call(&self, operation: &str) -> Result<(), DependencyError>;
}

/// Dependency that always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Connected;

impl ExternalDependency for Connected {
    fn call(&self, _operation: &str) -> Result<(), DependencyError> {
        Ok(())
    }
}

/// Dependency that always fails with a connection interruption.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disconnected;

impl ExternalDependency for Disconnected {
    fn call(&self, operation: &str) -> Result<(), DependencyError> {
        Err(DependencyError::new(format!(
            "connection to server interrupted during {}",
            operation
        )))
    }
}

/// Dependency that replays scripted results, then succeeds.
///
/// # Examples
///
/// ```
/// use usecase_core::{ExternalDependency, ScriptedDependency};
///
/// let dep = ScriptedDependency::new([false, true]);
/// assert!(dep.call("op").is_err());
/// assert!(dep.call("op").is_ok());
/// assert!(dep.call("op").is_ok()); // script exhausted
/// assert_eq!(dep.calls(), 3);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedDependency {
    script: Mutex<VecDeque<bool>>,
    calls: AtomicUsize,
}

impl ScriptedDependency {
    /// Creates a dependency answering with `results` in order (`true` = success).
    pub fn new(results: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: Mutex::new(results.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns how many times the dependency was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl ExternalDependency for ScriptedDependency {
    fn call(&self, operation: &str) -> Result<(), DependencyError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.script.lock().pop_front() {
            Some(false) => Disconnected.call(operation),
            _ => Ok(()),
        }
    }
}

impl<D: ExternalDependency + ?Sized> ExternalDependency for std::sync::Arc<D> {
    fn call(&self, operation: &str) -> Result<(), DependencyError> {
        (**self).call(operation)
    }
}
