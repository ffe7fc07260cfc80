//! Error conversion helpers for store calls
//!
//! Provides extension traits for cleaner error handling with operation context.

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::StoreResult;

/// Extension trait for converting `StoreResult` to `ApplicationResult` with context.
pub trait StoreResultExt<T> {
    /// Name the attempted operation in the error.
    ///
    /// # Example
    /// ```ignore
    /// store.update_state(id, &target, &ctx.cancel)
    ///     .with_operation("update state")?;
    /// // -> "failed to update state: rejected by service (409): ..."
    /// ```
    fn with_operation(self, operation: &str) -> ApplicationResult<T>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn with_operation(self, operation: &str) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Store {
            operation: operation.to_string(),
            source,
        })
    }
}
