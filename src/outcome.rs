use std::fmt;

use crate::error::Error;
use crate::record::RecordId;

/// Reason code attached to every [`OperationOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// The operation completed and state was changed
    Success,
    /// Input failed one or more validation rules
    ValidationFailed,
    /// A referenced record does not exist
    NotFound,
    /// The request conflicts with existing state
    Duplicate,
    /// The actor lacks the required role or ownership
    Unauthorized,
    /// The external dependency reported a failure
    ConnectionError,
    /// The actor declined to confirm the operation
    Cancelled,
}

impl ResultCode {
    /// Returns the stable SCREAMING_SNAKE_CASE name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultCode::Success => "SUCCESS",
            ResultCode::ValidationFailed => "VALIDATION_FAILED",
            ResultCode::NotFound => "NOT_FOUND",
            ResultCode::Duplicate => "DUPLICATE",
            ResultCode::Unauthorized => "UNAUTHORIZED",
            ResultCode::ConnectionError => "CONNECTION_ERROR",
            ResultCode::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized result of a store or handler operation.
///
/// Outcomes are built in one step by the constructors below; there is no
/// way to obtain a half-filled value.
///
/// # Examples
///
/// ```
/// use usecase_core::{OperationOutcome, ResultCode};
///
/// let outcome = OperationOutcome::failure(ResultCode::NotFound, "banner not found");
/// assert!(!outcome.is_success());
/// assert_eq!(outcome.code(), ResultCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    code: ResultCode,
    message: String,
    record_id: Option<RecordId>,
}

impl OperationOutcome {
    /// Creates a successful outcome, optionally naming the affected record.
    pub fn success(message: impl Into<String>, record_id: Option<RecordId>) -> Self {
        Self {
            code: ResultCode::Success,
            message: message.into(),
            record_id,
        }
    }

    /// Creates a failed outcome.
    ///
    /// Passing `ResultCode::Success` here is a logic error; it is still
    /// reported as a success by [`is_success`](Self::is_success).
    pub fn failure(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            record_id: None,
        }
    }

    /// Converts a handler pipeline result into an outcome.
    pub fn from_result(operation: &str, result: Result<RecordId, Error>) -> Self {
        match result {
            Ok(id) => Self::success(format!("{} completed", operation), Some(id)),
            Err(err) => Self::failure(err.code(), err.to_string()),
        }
    }

    /// Returns `true` when the code is [`ResultCode::Success`].
    pub fn is_success(&self) -> bool {
        self.code == ResultCode::Success
    }

    /// Returns the reason code.
    pub fn code(&self) -> ResultCode {
        self.code
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the affected record id, if any.
    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
