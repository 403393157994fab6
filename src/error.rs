use std::fmt;

use crate::dependency::DependencyError;
use crate::outcome::ResultCode;
use crate::request::Role;
use crate::store::StoreError;
use crate::validation::ValidationResult;

/// Failures a request can end in.
///
/// Every variant is a local, recoverable outcome; the handler converts it
/// into an [`OperationOutcome`](crate::OperationOutcome) instead of letting
/// it reach the caller.
#[derive(Debug)]
pub enum Error {
    /// Input failed validation
    Validation(ValidationResult),
    /// A referenced record is absent
    NotFound(String),
    /// Duplicate or already-processed request
    Conflict(String),
    /// The external dependency failed
    Dependency(DependencyError),
    /// The actor lacks the required role or ownership
    Authorization(Violation),
    /// The actor declined confirmation
    Cancelled,
}

impl Error {
    /// Returns the result code this failure is reported under.
    pub fn code(&self) -> ResultCode {
        match self {
            Error::Validation(_) => ResultCode::ValidationFailed,
            Error::NotFound(_) => ResultCode::NotFound,
            Error::Conflict(_) => ResultCode::Duplicate,
            Error::Dependency(_) => ResultCode::ConnectionError,
            Error::Authorization(_) => ResultCode::Unauthorized,
            Error::Cancelled => ResultCode::Cancelled,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(result) => write!(f, "Validation failed: {}", result.joined()),
            Error::NotFound(what) => write!(f, "Not found: {}", what),
            Error::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Error::Dependency(err) => write!(f, "{}", err),
            Error::Authorization(v) => write!(f, "Not authorized: {}", v),
            Error::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for Error {}

impl From<Violation> for Error {
    fn from(v: Violation) -> Self {
        Error::Authorization(v)
    }
}

impl From<DependencyError> for Error {
    fn from(e: DependencyError) -> Self {
        Error::Dependency(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Error::NotFound(format!("record {}", id)),
            duplicate @ StoreError::Duplicate { .. } => Error::Conflict(duplicate.to_string()),
        }
    }
}

/// An authorization violation with details about what failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The kind of violation that occurred
    pub kind: ViolationKind,
    /// Human-readable message explaining the violation
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Violation {}

/// The kind of authorization violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Authentication is required but missing
    Unauthenticated,
    /// The principal lacks a required role
    MissingRole {
        /// The role that was required
        role: Role,
    },
    /// The principal does not own the target data
    NotOwner {
        /// The owner the request targeted
        owner_id: String,
    },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Unauthenticated => write!(f, "Unauthenticated"),
            ViolationKind::MissingRole { role } => write!(f, "Missing role '{}'", role),
            ViolationKind::NotOwner { owner_id } => write!(f, "Not owner of '{}'", owner_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordId, RecordKind};

    #[test]
    fn each_error_maps_to_its_code() {
        assert_eq!(
            Error::from(StoreError::NotFound(RecordId::generate())).code(),
            ResultCode::NotFound
        );
        assert_eq!(Error::Conflict("x".into()).code(), ResultCode::Duplicate);
        assert_eq!(Error::Cancelled.code(), ResultCode::Cancelled);
        assert_eq!(
            Error::Dependency(DependencyError::new("down")).code(),
            ResultCode::ConnectionError
        );
        assert_eq!(
            Error::from(Violation::new(ViolationKind::Unauthenticated, "login")).code(),
            ResultCode::Unauthorized
        );
    }

    #[test]
    fn store_duplicate_becomes_conflict() {
        let err = Error::from(StoreError::Duplicate {
            kind: RecordKind::Tourist,
            key: "email=a@b.it".to_string(),
        });

        assert_eq!(err.code(), ResultCode::Duplicate);
        assert!(err.to_string().contains("email=a@b.it"));
    }

    #[test]
    fn violation_display_includes_kind_and_message() {
        let v = Violation::new(
            ViolationKind::MissingRole {
                role: Role::AgencyOperator,
            },
            "banners are managed by operators",
        );

        assert_eq!(
            v.to_string(),
            "Missing role 'agency_operator': banners are managed by operators"
        );
    }
}
