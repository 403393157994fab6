use crate::request::Role;

/// A session requirement checked by [`SessionGate::build`](crate::SessionGate::build).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyReq {
    /// Requires an authenticated principal
    Authenticated,
    /// Requires the principal to hold a role
    HasRole(Role),
}

/// Policy requiring authentication.
///
/// Use this to require that a principal is present in the request metadata.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;

/// Policy requiring the principal to hold a role.
///
/// Administrators satisfy every role requirement.
#[derive(Debug, Clone, Copy)]
pub struct HasRole(pub Role);

impl From<Authenticated> for PolicyReq {
    fn from(_: Authenticated) -> Self {
        PolicyReq::Authenticated
    }
}

impl From<HasRole> for PolicyReq {
    fn from(req: HasRole) -> Self {
        PolicyReq::HasRole(req.0)
    }
}
