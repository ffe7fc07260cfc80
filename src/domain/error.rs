//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::AliasState;

/// Domain errors represent business rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no aliases found for domain: {0}")]
    GroupNotFound(String),

    #[error("alias {id} is already {state}")]
    AlreadyInState { id: String, state: AliasState },

    #[error("alias not found: {0}")]
    AliasNotFound(String),
}
