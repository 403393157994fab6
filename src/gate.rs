use crate::{
    context::Ctx,
    error::{Violation, ViolationKind},
    policy::PolicyReq,
    request::RequestMeta,
};

/// The session gate.
///
/// `SessionGate` is the only way to construct a `Ctx`. It checks session
/// requirements (login, roles) before handing out the context.
///
/// # Examples
///
/// ```
/// use usecase_core::{Authenticated, HasRole, Principal, RequestMeta, Role, SessionGate};
///
/// let meta = RequestMeta::for_principal(
///     "req-123",
///     Principal::new("op-1", "Bruno", Role::AgencyOperator),
/// );
///
/// let ctx = SessionGate::new(meta)
///     .require(Authenticated)
///     .require(HasRole(Role::AgencyOperator))
///     .build()
///     .expect("operator session");
///
/// assert_eq!(ctx.principal().map(|p| p.id.as_str()), Some("op-1"));
/// ```
///
/// A guest session has no requirements:
///
/// ```
/// use usecase_core::{RequestMeta, SessionGate};
///
/// let ctx = SessionGate::new(RequestMeta::guest("req-9")).build().unwrap();
/// assert!(!ctx.is_authenticated());
/// ```
#[derive(Debug)]
pub struct SessionGate {
    meta: RequestMeta,
    requirements: Vec<PolicyReq>,
}

impl SessionGate {
    /// Creates a new gate with the given request metadata.
    pub fn new(meta: RequestMeta) -> Self {
        Self {
            meta,
            requirements: Vec::new(),
        }
    }

    /// Adds a requirement to the gate, deduplicating identical requirements.
    ///
    /// Returns the updated gate to allow method chaining.
    pub fn require(mut self, policy: impl Into<PolicyReq>) -> Self {
        let req = policy.into();

        if !self.requirements.contains(&req) {
            self.requirements.push(req);
        }

        self
    }

    /// Returns the number of distinct requirements.
    pub fn requirement_count(&self) -> usize {
        self.requirements.len()
    }

    /// Builds a `Ctx` after validating every requirement.
    ///
    /// # Errors
    ///
    /// Returns a `Violation` for the first requirement that fails.
    pub fn build(self) -> Result<Ctx, Violation> {
        self.validate_all()?;

        tracing::debug!(
            request_id = %self.meta.request_id,
            authenticated = self.meta.principal.is_some(),
            "session established"
        );
        Ok(Ctx::new_unchecked(self.meta.request_id, self.meta.principal))
    }

    fn validate_all(&self) -> Result<(), Violation> {
        for req in &self.requirements {
            self.validate_one(req)?;
        }
        Ok(())
    }

    fn validate_one(&self, req: &PolicyReq) -> Result<(), Violation> {
        let principal = self.meta.principal.as_ref().ok_or_else(|| {
            Violation::new(ViolationKind::Unauthenticated, "Authentication required")
        })?;

        match req {
            PolicyReq::Authenticated => Ok(()),
            PolicyReq::HasRole(role) if principal.has_role(*role) => Ok(()),
            PolicyReq::HasRole(role) => Err(Violation::new(
                ViolationKind::MissingRole { role: *role },
                format!("principal {} lacks the required role", principal.id),
            )),
        }
    }
}
