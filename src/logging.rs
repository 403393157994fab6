use std::fmt;

use crate::state::RequestState;

/// Request-scoped logging interface.
///
/// `RequestLog` is obtained from `Ctx::log()` and is lifetime-bound to the
/// context. Every event carries the request id.
///
/// Secret values are redacted when logged due to their `Debug` and
/// `Display` implementations.
#[derive(Debug)]
pub struct RequestLog<'a> {
    request_id: &'a str,
}

impl<'a> RequestLog<'a> {
    /// Creates a new RequestLog with a request ID.
    ///
    /// This is `pub(crate)` - only `Ctx` can create it.
    pub(crate) fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs an info-level message with request ID.
    ///
    /// Use with `format_args!`:
    /// ```no_run
    /// # use usecase_core::{RequestLog, Secret};
    /// # fn example(log: &RequestLog) {
    /// let password = Secret::new("hunter22");
    /// log.info(format_args!("registering with {}", password));
    /// # }
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a warning-level message with request ID.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a debug-level message with request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, "{}", args);
    }

    /// Records a request state transition at debug level.
    pub fn transition(&self, from: RequestState, to: RequestState) {
        tracing::debug!(
            request_id = %self.request_id,
            from = %from,
            to = %to,
            "request state changed"
        );
    }
}
