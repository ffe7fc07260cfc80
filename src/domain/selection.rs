//! Authoritative alias selection among duplicates for one domain.

use crate::domain::{Alias, AliasState};

/// Priority assigned to states this client does not recognize.
/// Larger than every defined priority.
pub const UNKNOWN_PRIORITY: u8 = u8::MAX;

/// Selection priority of a state; lower wins.
pub fn state_priority(state: &AliasState) -> u8 {
    match state {
        AliasState::Enabled => 0,
        AliasState::Pending => 1,
        AliasState::Disabled => 2,
        AliasState::Deleted => 3,
        AliasState::Unknown(_) => UNKNOWN_PRIORITY,
    }
}

/// Pick the authoritative alias from candidates sharing a domain.
///
/// Single pass keeping the lowest-priority element; on ties the earliest
/// candidate is kept. Returns `None` for an empty slice.
pub fn select_authoritative(candidates: &[Alias]) -> Option<&Alias> {
    let mut best: Option<(&Alias, u8)> = None;
    for candidate in candidates {
        let priority = state_priority(&candidate.state);
        match best {
            // strict comparison keeps the earlier of equal candidates
            Some((_, best_priority)) if priority >= best_priority => {}
            _ => best = Some((candidate, priority)),
        }
    }
    best.map(|(alias, _)| alias)
}
