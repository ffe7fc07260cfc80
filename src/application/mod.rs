//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on the store boundary traits.

pub mod bulk;
pub mod context;
pub mod error;
pub mod error_ext;
pub mod outcome;
pub mod report;
pub mod services;

pub use context::{OutputMode, RequestContext};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::StoreResultExt;
pub use report::Render;
