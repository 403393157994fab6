use crate::error::{Violation, ViolationKind};
use crate::logging::RequestLog;
use crate::request::{Principal, Role};

/// Explicit session object passed into every handler call.
///
/// `Ctx` replaces process-wide session state: it carries the request id and
/// the principal (if logged in) for exactly one request. It cannot be
/// constructed by user code; use [`SessionGate`](crate::SessionGate).
///
/// # Examples
///
/// ```
/// use usecase_core::{Authenticated, HasRole, Principal, RequestMeta, Role, SessionGate};
///
/// let meta = RequestMeta::for_principal("req-1", Principal::new("t1", "Ada", Role::Tourist));
/// let ctx = SessionGate::new(meta)
///     .require(Authenticated)
///     .require(HasRole(Role::Tourist))
///     .build()
///     .expect("tourist session");
///
/// assert!(ctx.is_authenticated());
/// let guest = ctx.logout();
/// assert!(!guest.is_authenticated());
/// assert_eq!(guest.request_id(), "req-1");
/// ```
#[derive(Debug, Clone)]
pub struct Ctx {
    request_id: String,
    principal: Option<Principal>,
}

impl Ctx {
    /// Creates a context without running any policy.
    ///
    /// This is `pub(crate)`; `SessionGate` calls it after validating policies.
    pub(crate) fn new_unchecked(request_id: String, principal: Option<Principal>) -> Self {
        Self {
            request_id,
            principal,
        }
    }

    /// Returns the request ID for this context.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the principal if logged in.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Returns `true` if a principal is present.
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Returns a logger bound to this request.
    pub fn log(&self) -> RequestLog<'_> {
        RequestLog::new(&self.request_id)
    }

    /// Ends the session, returning a guest context for the same request.
    pub fn logout(self) -> Ctx {
        if let Some(p) = &self.principal {
            self.log().info(format_args!("principal {} logged out", p.id));
        }
        Ctx::new_unchecked(self.request_id, None)
    }

    /// Checks that the principal holds `role`.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without a principal and `MissingRole` when
    /// the role is absent.
    pub fn require_role(&self, role: Role) -> Result<&Principal, Violation> {
        let principal = self.principal.as_ref().ok_or_else(|| {
            Violation::new(ViolationKind::Unauthenticated, "Authentication required")
        })?;
        if principal.has_role(role) {
            Ok(principal)
        } else {
            Err(Violation::new(
                ViolationKind::MissingRole { role },
                format!("principal {} lacks the required role", principal.id),
            ))
        }
    }

    /// Checks that the principal holds `role` and acts on its own data.
    ///
    /// Administrators may act on behalf of any owner.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`require_role`](Self::require_role), or
    /// `NotOwner` if the principal id differs from `owner_id`.
    pub fn require_owner(&self, role: Role, owner_id: &str) -> Result<&Principal, Violation> {
        let principal = self.require_role(role)?;
        if principal.id == owner_id || principal.is_administrator() {
            Ok(principal)
        } else {
            Err(Violation::new(
                ViolationKind::NotOwner {
                    owner_id: owner_id.to_string(),
                },
                format!("principal {} cannot act for another account", principal.id),
            ))
        }
    }
}
