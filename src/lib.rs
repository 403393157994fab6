//! Use-case handling core: validated commands over an in-memory entity store.
//!
//! Every use case follows the same flow, driven by [`RequestHandler`]:
//! - **Validate**: field rules built from [`ValidationRules`] reject bad input
//! - **Check**: role, ownership, referenced records and duplicates
//! - **Call**: the injectable [`ExternalDependency`] may fail with `CONNECTION_ERROR`
//! - **Persist**: a single mutation of the [`EntityStore`]
//! - **Notify**: the [`Notifier`] sees every outcome
//!
//! Failures never leave a partial mutation behind and always surface as an
//! [`OperationOutcome`] carrying a [`ResultCode`].
//!
//! # Core Types
//!
//! - [`EntityStore`]: thread-safe record collection with soft delete
//! - [`Validator`]: ordered field rules producing a [`ValidationResult`]
//! - [`SessionGate`]: builder validating a session and creating a [`Ctx`]
//! - [`Command`]: one use-case request
//! - [`Secret<T>`]: wrapper that redacts sensitive values in logs
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use usecase_core::{
//!     Authenticated, Command, EntityStore, HasRole, Principal, RequestHandler, RequestMeta,
//!     ResultCode, Role, SessionGate,
//! };
//!
//! let store = Arc::new(EntityStore::new());
//! let handler = RequestHandler::builder(Arc::clone(&store)).build();
//!
//! let meta = RequestMeta::for_principal("req-1", Principal::new("op-1", "Bea", Role::AgencyOperator));
//! let ctx = SessionGate::new(meta)
//!     .require(Authenticated)
//!     .require(HasRole(Role::AgencyOperator))
//!     .build()
//!     .expect("session valid");
//!
//! let outcome = handler.handle(&ctx, Command::InsertRefreshmentPoint { name: "Bar Sole".into() });
//! assert_eq!(outcome.code(), ResultCode::Success);
//! assert_eq!(store.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod command;
mod config;
mod context;
mod dependency;
mod error;
mod gate;
mod handler;
mod logging;
mod notify;
mod outcome;
mod policy;
mod record;
mod request;
mod secret;
mod state;
mod store;
mod validation;

pub use command::Command;
pub use config::{Config, ConfigError, ValidationRules};
pub use context::Ctx;
pub use dependency::{
    Connected, DependencyError, Disconnected, ExternalDependency, ScriptedDependency,
};
pub use error::{Error, Violation, ViolationKind};
pub use gate::SessionGate;
pub use handler::{AutoConfirm, Confirm, RequestHandler, RequestHandlerBuilder};
pub use logging::RequestLog;
pub use notify::{FanoutNotifier, Notification, Notifier, NotifyError, TracingNotifier};
pub use outcome::{OperationOutcome, ResultCode};
pub use policy::{Authenticated, HasRole, PolicyReq};
pub use record::{FieldValue, Fields, NewRecord, Record, RecordId, RecordKind, RecordStatus};
pub use request::{Principal, RequestMeta, Role};
pub use secret::Secret;
pub use state::RequestState;
pub use store::{EntityStore, StoreError};
pub use validation::{Rule, ValidationResult, Validator};
