//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the store boundary traits (AliasStore, ItemStore)
//! but are themselves concrete structs, not traits.

mod alias;
mod items;

pub use alias::AliasService;
pub use items::ItemService;
