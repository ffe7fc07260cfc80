//! Remote store boundary traits
//!
//! These traits abstract the remote mail/alias service, allowing services
//! to be tested against an in-memory store.

use thiserror::Error;

use crate::domain::{Alias, AliasMetadata, AliasState, Item, NewAlias};
use crate::infrastructure::cancel::CancelToken;

/// Failure of a single store call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected by service ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

/// Result type for store calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Alias operations of the remote service.
pub trait AliasStore: Send + Sync {
    /// Fetch one alias by id.
    fn fetch_alias(&self, id: &str, cancel: &CancelToken) -> StoreResult<Alias>;

    /// Fetch every alias of a domain. An empty list is not an error.
    fn fetch_group(&self, domain: &str, cancel: &CancelToken) -> StoreResult<Vec<Alias>>;

    /// Fetch all aliases of the account.
    fn list_aliases(&self, cancel: &CancelToken) -> StoreResult<Vec<Alias>>;

    /// Create an alias; returns the stored record.
    fn create_alias(&self, alias: &NewAlias, cancel: &CancelToken) -> StoreResult<Alias>;

    /// Move an alias into a lifecycle state.
    fn update_state(&self, id: &str, state: &AliasState, cancel: &CancelToken)
        -> StoreResult<()>;

    /// Change descriptive fields. Never touches state.
    fn update_metadata(
        &self,
        id: &str,
        fields: &AliasMetadata,
        cancel: &CancelToken,
    ) -> StoreResult<()>;
}

/// Mail item operations of the remote service.
pub trait ItemStore: Send + Sync {
    /// Fetch the items with the given ids. Unknown ids are omitted from the result.
    fn fetch_items(&self, ids: &[String], cancel: &CancelToken) -> StoreResult<Vec<Item>>;

    fn delete_item(&self, id: &str, cancel: &CancelToken) -> StoreResult<()>;

    fn move_item(&self, id: &str, mailbox: &str, cancel: &CancelToken) -> StoreResult<()>;

    fn set_read(&self, id: &str, read: bool, cancel: &CancelToken) -> StoreResult<()>;
}
