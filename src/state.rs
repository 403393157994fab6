//! Lifecycle of a single handled request.
//!
//! ```text
//! Received -> Validating -> { Rejected | Checking }
//!          Checking -> { Rejected | CallingDependency }
//!          CallingDependency -> { Failed | Persisting }
//!          Persisting -> { Failed | Notified }
//! ```
//!
//! `Rejected`, `Failed` and `Notified` are terminal.

use std::fmt;

/// State of a request inside [`RequestHandler::handle`](crate::RequestHandler::handle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    /// Command accepted by the handler
    Received,
    /// Running field validation
    Validating,
    /// Checking authorization, references, duplicates and confirmation
    Checking,
    /// Waiting on the external dependency
    CallingDependency,
    /// Mutating the entity store
    Persisting,
    /// Stopped before any side effect (validation or precondition failure)
    Rejected,
    /// Dependency or store failure; the store was not changed
    Failed,
    /// Mutation done and the notifier has returned
    Notified,
}

impl RequestState {
    /// Returns `true` for states a request cannot leave.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Rejected | RequestState::Failed | RequestState::Notified
        )
    }

    /// Returns `true` if moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Received, Validating)
                | (Validating, Rejected)
                | (Validating, Checking)
                | (Checking, Rejected)
                | (Checking, CallingDependency)
                | (CallingDependency, Failed)
                | (CallingDependency, Persisting)
                | (Persisting, Failed)
                | (Persisting, Notified)
        )
    }

    /// Returns the stable snake_case name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Received => "received",
            RequestState::Validating => "validating",
            RequestState::Checking => "checking",
            RequestState::CallingDependency => "calling_dependency",
            RequestState::Persisting => "persisting",
            RequestState::Rejected => "rejected",
            RequestState::Failed => "failed",
            RequestState::Notified => "notified",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_final_states_are_terminal() {
        assert!(RequestState::Rejected.is_terminal());
        assert!(RequestState::Failed.is_terminal());
        assert!(RequestState::Notified.is_terminal());
        assert!(!RequestState::Persisting.is_terminal());
        assert!(!RequestState::Received.is_terminal());
    }

    #[test]
    fn terminal_states_have_no_successors() {
        let all = [
            RequestState::Received,
            RequestState::Validating,
            RequestState::Checking,
            RequestState::CallingDependency,
            RequestState::Persisting,
            RequestState::Rejected,
            RequestState::Failed,
            RequestState::Notified,
        ];
        for from in all.iter().filter(|s| s.is_terminal()) {
            assert!(all.iter().all(|to| !from.can_transition_to(*to)), "{from}");
        }
    }

    #[test]
    fn steps_cannot_be_skipped() {
        assert!(!RequestState::Received.can_transition_to(RequestState::Checking));
        assert!(!RequestState::Validating.can_transition_to(RequestState::Persisting));
        assert!(!RequestState::Checking.can_transition_to(RequestState::Persisting));
        assert!(RequestState::CallingDependency.can_transition_to(RequestState::Persisting));
    }
}
