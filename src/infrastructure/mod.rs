//! Infrastructure layer: remote store implementations and DI container
//!
//! This layer implements the store boundary traits and wires up services.

pub mod cancel;
pub mod di;
pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use cancel::CancelToken;
pub use error::{InfraError, InfraResult};
