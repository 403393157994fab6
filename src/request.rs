use std::fmt;

/// Metadata about an incoming request.
///
/// Contains the request identifier and optional principal (authenticated actor).
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// Unique identifier for this request
    pub request_id: String,
    /// Authenticated principal, if any
    pub principal: Option<Principal>,
}

impl RequestMeta {
    /// Creates metadata for a guest (unauthenticated) request.
    pub fn guest(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            principal: None,
        }
    }

    /// Creates metadata for a request made by `principal`.
    pub fn for_principal(request_id: impl Into<String>, principal: Principal) -> Self {
        Self {
            request_id: request_id.into(),
            principal: Some(principal),
        }
    }
}

/// Role held by a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Registered tourist
    Tourist,
    /// Travel agency operator managing refreshment points and banners
    AgencyOperator,
    /// Platform administrator; satisfies every role requirement
    Administrator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Tourist => write!(f, "tourist"),
            Role::AgencyOperator => write!(f, "agency_operator"),
            Role::Administrator => write!(f, "administrator"),
        }
    }
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Unique identifier for this principal
    pub id: String,
    /// Display name
    pub name: String,
    /// Roles granted to the principal
    pub roles: Vec<Role>,
}

impl Principal {
    /// Creates a principal holding a single role.
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            roles: vec![role],
        }
    }

    /// Returns `true` if the principal holds `role` or is an administrator.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles
            .iter()
            .any(|r| *r == role || *r == Role::Administrator)
    }

    /// Returns `true` if the principal is an administrator.
    pub fn is_administrator(&self) -> bool {
        self.roles.contains(&Role::Administrator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrator_satisfies_every_role() {
        let admin = Principal::new("a1", "Root", Role::Administrator);

        assert!(admin.has_role(Role::Tourist));
        assert!(admin.has_role(Role::AgencyOperator));
        assert!(admin.is_administrator());
    }

    #[test]
    fn tourist_lacks_operator_role() {
        let tourist = Principal::new("t1", "Ada", Role::Tourist);

        assert!(tourist.has_role(Role::Tourist));
        assert!(!tourist.has_role(Role::AgencyOperator));
        assert!(!tourist.has_role(Role::Administrator));
    }

    #[test]
    fn guest_meta_has_no_principal() {
        let meta = RequestMeta::guest("req-1");
        assert!(meta.principal.is_none());
    }
}
