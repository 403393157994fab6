//! Request orchestration.
//!
//! [`RequestHandler::handle`] is the single entry point for every use
//! case. Each request runs to completion in a fixed order:
//!
//! 1. validate the command payload
//! 2. check authorization, referenced records and duplicates; ask for
//!    confirmation when the command changes or removes existing records
//! 3. call the external dependency
//! 4. mutate the entity store
//! 5. notify
//!
//! Steps 1 and 2 never touch the store, and the dependency is called
//! before the mutation, so every failure leaves the store unchanged.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::command::Command;
use crate::config::{Config, ValidationRules};
use crate::context::Ctx;
use crate::dependency::{Connected, ExternalDependency};
use crate::error::Error;
use crate::logging::RequestLog;
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::outcome::{OperationOutcome, ResultCode};
use crate::record::{FieldValue, Fields, NewRecord, RecordId, RecordKind};
use crate::state::RequestState;
use crate::store::EntityStore;

/// Asks the actor to confirm a command that changes or removes records.
pub trait Confirm: Send + Sync {
    /// Returns `true` to go ahead, `false` to cancel.
    fn confirm(&self, ctx: &Ctx, command: &Command) -> bool;
}

/// Confirms every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _ctx: &Ctx, _command: &Command) -> bool {
        true
    }
}

impl<F> Confirm for F
where
    F: Fn(&Ctx, &Command) -> bool + Send + Sync,
{
    fn confirm(&self, ctx: &Ctx, command: &Command) -> bool {
        self(ctx, command)
    }
}

/// The single store mutation a command resolves to.
#[derive(Debug)]
enum Mutation {
    Create(NewRecord),
    Update { id: RecordId, fields: Fields },
    Delete(RecordId),
}

/// Tracks the request state machine and logs each transition.
struct Progress<'a> {
    state: RequestState,
    log: RequestLog<'a>,
}

impl<'a> Progress<'a> {
    fn new(log: RequestLog<'a>) -> Self {
        Self {
            state: RequestState::Received,
            log,
        }
    }

    fn advance(&mut self, next: RequestState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        self.log.transition(self.state, next);
        self.state = next;
    }

    fn stop(&mut self, terminal: RequestState, err: Error) -> Error {
        self.advance(terminal);
        err
    }
}

/// Orchestrates validate, check, call, persist and notify for every command.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use usecase_core::{
///     Command, EntityStore, Principal, RequestHandler, RequestMeta, ResultCode, Role,
///     SessionGate,
/// };
///
/// let store = Arc::new(EntityStore::new());
/// let handler = RequestHandler::builder(Arc::clone(&store)).build();
///
/// let meta = RequestMeta::for_principal("req-1", Principal::new("t1", "Ada", Role::Tourist));
/// let ctx = SessionGate::new(meta).build().unwrap();
///
/// let submit = || Command::SubmitFeedback {
///     tourist_id: "t1".into(),
///     site_id: "s1".into(),
///     vote: 5,
///     comment: "Great".into(),
/// };
///
/// assert_eq!(handler.handle(&ctx, submit()).code(), ResultCode::Success);
/// assert_eq!(handler.handle(&ctx, submit()).code(), ResultCode::Duplicate);
/// ```
pub struct RequestHandler {
    store: Arc<EntityStore>,
    rules: ValidationRules,
    dependency: Box<dyn ExternalDependency>,
    notifier: Box<dyn Notifier>,
    confirm: Box<dyn Confirm>,
}

impl fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandler")
            .field("store", &self.store)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl RequestHandler {
    /// Starts building a handler over `store`.
    pub fn builder(store: Arc<EntityStore>) -> RequestHandlerBuilder {
        RequestHandlerBuilder {
            store,
            rules: ValidationRules::default(),
            dependency: Box::new(Connected),
            notifier: Box::new(TracingNotifier),
            confirm: Box::new(AutoConfirm),
        }
    }

    /// Returns the store this handler mutates.
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// Returns the validation thresholds in use.
    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Handles one command on behalf of `ctx`.
    ///
    /// Never panics on bad input; every failure is reported through the
    /// returned outcome, which is also passed to the notifier.
    pub fn handle(&self, ctx: &Ctx, command: Command) -> OperationOutcome {
        let span = tracing::info_span!(
            "handle",
            request_id = %ctx.request_id(),
            operation = command.name()
        );
        let _guard = span.enter();

        let mut progress = Progress::new(ctx.log());
        let result = self.run(ctx, &command, &mut progress);
        let outcome = OperationOutcome::from_result(command.name(), result);

        // A persisted request is still in `Persisting` here.
        let persisted = !progress.state.is_terminal();
        let final_state = if persisted {
            RequestState::Notified
        } else {
            progress.state
        };
        self.notify(ctx, &command, &outcome, final_state);
        if persisted {
            progress.advance(RequestState::Notified);
        }
        outcome
    }

    fn run(
        &self,
        ctx: &Ctx,
        command: &Command,
        progress: &mut Progress<'_>,
    ) -> Result<RecordId, Error> {
        progress.advance(RequestState::Validating);
        self.validate(command)
            .map_err(|e| progress.stop(RequestState::Rejected, e))?;

        progress.advance(RequestState::Checking);
        let mutation = self
            .check(ctx, command)
            .map_err(|e| progress.stop(RequestState::Rejected, e))?;

        progress.advance(RequestState::CallingDependency);
        self.dependency
            .call(command.name())
            .map_err(|e| progress.stop(RequestState::Failed, e.into()))?;

        progress.advance(RequestState::Persisting);
        let id = self
            .persist(mutation)
            .map_err(|e| progress.stop(RequestState::Failed, e))?;

        progress
            .log
            .debug(format_args!("{} persisted record {}", command.name(), id));
        Ok(id)
    }

    fn validate(&self, command: &Command) -> Result<(), Error> {
        let result = command.validator(&self.rules).validate(&command.payload());
        if result.is_valid() {
            Ok(())
        } else {
            Err(Error::Validation(result))
        }
    }

    fn check(&self, ctx: &Ctx, command: &Command) -> Result<Mutation, Error> {
        if let Some(role) = command.required_role() {
            match command.owner() {
                Some(owner) => ctx.require_owner(role, owner)?,
                None => ctx.require_role(role)?,
            };
        }

        let actor = ctx.principal().map_or("guest", |p| p.id.as_str());
        let mutation = self.plan(actor, command)?;

        if command.needs_confirmation() && !self.confirm.confirm(ctx, command) {
            return Err(Error::Cancelled);
        }
        Ok(mutation)
    }

    /// Resolves a command into a mutation, checking references and duplicates.
    fn plan(&self, actor: &str, command: &Command) -> Result<Mutation, Error> {
        let mutation = match command {
            Command::RegisterTourist {
                name,
                surname,
                email,
                password,
            } => {
                let email = email.trim().to_lowercase();
                let digest = hex::encode(Sha256::digest(password.expose_secret().as_bytes()));
                NewRecord::new(RecordKind::Tourist, email.clone())
                    .with_field("name", name.trim())
                    .with_field("surname", surname.trim())
                    .with_field("email", email)
                    .with_field("password_digest", digest)
                    .into_create()
            }
            Command::SubmitFeedback {
                tourist_id,
                site_id,
                vote,
                comment,
            } => NewRecord::new(RecordKind::Feedback, tourist_id.trim())
                .with_field("tourist_id", tourist_id.trim())
                .with_field("site_id", site_id.trim())
                .with_field("vote", *vote)
                .with_field("comment", comment.trim())
                .into_create(),
            Command::AddPreferredSite {
                tourist_id,
                site_id,
            } => NewRecord::new(RecordKind::PreferredSite, tourist_id.trim())
                .with_field("tourist_id", tourist_id.trim())
                .with_field("site_id", site_id.trim())
                .into_create(),
            Command::RemovePreferredSite {
                tourist_id,
                site_id,
            } => {
                let key = NewRecord::new(RecordKind::PreferredSite, tourist_id.trim())
                    .with_field("tourist_id", tourist_id.trim())
                    .with_field("site_id", site_id.trim());
                let record = self
                    .store
                    .find_by_natural_key(RecordKind::PreferredSite, &key.fields)
                    .ok_or_else(|| {
                        Error::NotFound(format!(
                            "site {} is not among the preferred sites of {}",
                            site_id.trim(),
                            tourist_id.trim()
                        ))
                    })?;
                Mutation::Delete(record.id())
            }
            Command::InsertRefreshmentPoint { name } => {
                NewRecord::new(RecordKind::RefreshmentPoint, actor)
                    .with_field("name", name.trim())
                    .into_create()
            }
            Command::InsertBanner {
                refreshment_point_id,
                image,
            } => {
                self.store
                    .find_active(RecordKind::RefreshmentPoint, refreshment_point_id)?;
                NewRecord::new(RecordKind::Banner, actor)
                    .with_field("refreshment_point_id", *refreshment_point_id)
                    .with_field("image", image.trim())
                    .into_create()
            }
            Command::ChangeBannerImage { banner_id, image } => {
                self.store.find_active(RecordKind::Banner, banner_id)?;
                let mut fields = Fields::new();
                fields.insert("image".to_string(), FieldValue::from(image.trim()));
                Mutation::Update {
                    id: *banner_id,
                    fields,
                }
            }
            Command::DeleteBanner { banner_id } => {
                self.store.find_active(RecordKind::Banner, banner_id)?;
                Mutation::Delete(*banner_id)
            }
            Command::InsertNews { title, body } => NewRecord::new(RecordKind::News, actor)
                .with_field("title", title.trim())
                .with_field("body", body.trim())
                .into_create(),
            Command::DeleteNews { news_id } => {
                self.store.find_active(RecordKind::News, news_id)?;
                Mutation::Delete(*news_id)
            }
        };

        if let Mutation::Create(draft) = &mutation {
            self.store.check_unique(draft)?;
        }
        Ok(mutation)
    }

    fn persist(&self, mutation: Mutation) -> Result<RecordId, Error> {
        match mutation {
            Mutation::Create(draft) => Ok(self.store.create(draft)?),
            Mutation::Update { id, fields } => {
                into_result(self.store.update(&id, move |current| current.extend(fields)))
            }
            Mutation::Delete(id) => into_result(self.store.delete(&id)),
        }
    }

    fn notify(&self, ctx: &Ctx, command: &Command, outcome: &OperationOutcome, state: RequestState) {
        let notification = Notification {
            request_id: ctx.request_id().to_string(),
            principal: ctx.principal().map(|p| p.id.clone()),
            operation: command.name(),
            outcome: outcome.clone(),
            final_state: state,
        };
        if let Err(e) = self.notifier.notify(&notification) {
            ctx.log().warn(format_args!("{} ({})", e, command.name()));
        }
    }
}

impl NewRecord {
    fn into_create(self) -> Mutation {
        Mutation::Create(self)
    }
}

/// Maps a store outcome back into the handler pipeline.
fn into_result(outcome: OperationOutcome) -> Result<RecordId, Error> {
    match (outcome.code(), outcome.record_id()) {
        (ResultCode::Success, Some(id)) => Ok(id),
        (ResultCode::Duplicate, _) => Err(Error::Conflict(outcome.message().to_string())),
        _ => Err(Error::NotFound(outcome.message().to_string())),
    }
}

/// Builder for [`RequestHandler`].
pub struct RequestHandlerBuilder {
    store: Arc<EntityStore>,
    rules: ValidationRules,
    dependency: Box<dyn ExternalDependency>,
    notifier: Box<dyn Notifier>,
    confirm: Box<dyn Confirm>,
}

impl fmt::Debug for RequestHandlerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandlerBuilder")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl RequestHandlerBuilder {
    /// Sets the validation thresholds.
    pub fn rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Takes the validation thresholds from a loaded configuration.
    pub fn config(self, config: &Config) -> Self {
        self.rules(config.rules.clone())
    }

    /// Sets the external dependency (default: [`Connected`]).
    pub fn dependency(mut self, dependency: impl ExternalDependency + 'static) -> Self {
        self.dependency = Box::new(dependency);
        self
    }

    /// Sets the notifier (default: [`TracingNotifier`]).
    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Sets the confirmation prompt (default: [`AutoConfirm`]).
    pub fn confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    /// Builds the handler.
    pub fn build(self) -> RequestHandler {
        RequestHandler {
            store: self.store,
            rules: self.rules,
            dependency: self.dependency,
            notifier: self.notifier,
            confirm: self.confirm,
        }
    }
}
