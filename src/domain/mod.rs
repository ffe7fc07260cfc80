//! Domain layer: entities and lifecycle rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod selection;
pub mod target;
pub mod transition;

pub use entities::*;
pub use error::DomainError;
pub use selection::{select_authoritative, state_priority};
pub use target::Target;
pub use transition::{ensure_transition, Action};
