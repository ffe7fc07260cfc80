//! Per-invocation request context, passed explicitly to every service call.

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::infrastructure::CancelToken;

/// How outcomes are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Human-readable summary lines
    #[default]
    Text,
    /// Structured JSON payloads
    Json,
}

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub dry_run: bool,
    pub output: OutputMode,
    /// Domain addressed by group commands
    pub group_key: Option<String>,
    pub cancel: CancelToken,
}

impl RequestContext {
    pub fn new(dry_run: bool, output: OutputMode) -> Self {
        Self {
            dry_run,
            output,
            ..Self::default()
        }
    }

    pub fn with_group_key(mut self, group_key: impl Into<String>) -> Self {
        self.group_key = Some(group_key.into());
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Group key for group commands; missing is a usage error.
    pub fn group_key(&self) -> Result<&str, DomainError> {
        self.group_key
            .as_deref()
            .ok_or_else(|| DomainError::Validation("no domain given for group operation".into()))
    }
}
