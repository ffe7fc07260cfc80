//! State transition rules and human action verbs.

use crate::domain::{Alias, AliasState, DomainError};

/// Verb forms describing a change into a target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    /// "disable", used in previews ("Would disable ...")
    pub verb: &'static str,
    /// "Disabled", used in summaries ("Disabled 3 ...")
    pub past: &'static str,
}

impl Action {
    /// Action for moving an alias into `target`.
    ///
    /// Pending and unrecognized targets map to the generic "update".
    pub fn for_state(target: &AliasState) -> Self {
        match target {
            AliasState::Enabled => Action {
                verb: "enable",
                past: "Enabled",
            },
            AliasState::Disabled => Action {
                verb: "disable",
                past: "Disabled",
            },
            AliasState::Deleted => Action {
                verb: "delete",
                past: "Deleted",
            },
            AliasState::Pending | AliasState::Unknown(_) => Action {
                verb: "update",
                past: "Updated",
            },
        }
    }
}

/// Whether moving `current` into `target` changes nothing.
pub fn is_noop(current: &AliasState, target: &AliasState) -> bool {
    current == target
}

/// Reject a single-alias transition that is already satisfied.
pub fn ensure_transition(alias: &Alias, target: &AliasState) -> Result<(), DomainError> {
    if is_noop(&alias.state, target) {
        return Err(DomainError::AlreadyInState {
            id: alias.id.clone(),
            state: alias.state.clone(),
        });
    }
    Ok(())
}
