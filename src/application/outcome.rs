//! Outcome payloads returned by services and rendered by the reporter.
//!
//! Field names are the structured (JSON) contract and stay stable.

use serde::Serialize;

use crate::application::bulk::{BulkOperationResult, ItemFailure, PlanEntry};
use crate::domain::{Alias, AliasState};

/// Dry-run preview of a single alias state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePreview {
    pub dry_run: bool,
    pub id: String,
    pub current_state: AliasState,
    pub new_state: AliasState,
}

/// Committed single alias state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChange {
    pub id: String,
    pub state: AliasState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SingleOutcome {
    Preview(StatePreview),
    Committed(StateChange),
}

/// Dry-run preview of a domain-wide state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPreview {
    pub dry_run: bool,
    pub group_key: String,
    #[serde(skip)]
    pub target: AliasState,
    pub count: usize,
    pub items: Vec<PlanEntry>,
}

/// Result of a domain-wide state change.
///
/// `dry_run` is set when a dry run found nothing pending: no call was made
/// and every member is reported unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReport {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
    pub group_key: String,
    pub state: AliasState,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<ItemFailure>,
}

impl GroupReport {
    pub fn new(group_key: &str, state: &AliasState, result: BulkOperationResult) -> Self {
        Self {
            dry_run: false,
            group_key: group_key.to_string(),
            state: state.clone(),
            succeeded: result.succeeded_count(),
            failed: result.failed_count(),
            errors: result.failed,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BulkOutcome {
    Preview(GroupPreview),
    Applied(GroupReport),
}

/// Verb and qualifier of a mail item mutation, e.g. ("move", "Moved", "to Archive").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAction {
    pub verb: &'static str,
    pub past: &'static str,
    pub qualifier: String,
}

/// Dry-run preview of a bulk item mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPreview {
    #[serde(skip)]
    pub action: ItemAction,
    pub dry_run: bool,
    pub count: usize,
    pub items: Vec<PlanEntry>,
}

/// Result of a bulk item mutation: `{succeeded: [ids], failed: [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReport {
    #[serde(skip)]
    pub action: ItemAction,
    /// Dry run with nothing pending; see [`GroupReport`].
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
    #[serde(flatten)]
    pub result: BulkOperationResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ItemOutcome {
    Preview(ItemPreview),
    Applied(ItemReport),
}

/// The authoritative alias of a domain, possibly just created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAlias {
    pub created: bool,
    pub alias: Alias,
}

/// Dry-run preview of creating an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreview {
    pub dry_run: bool,
    pub domain: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResolveOutcome {
    Resolved(ResolvedAlias),
    WouldCreate(CreatePreview),
}

/// Description change, previewed or committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionChange {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
    pub id: String,
    pub description: String,
}

/// Plain listing of aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AliasListing {
    pub aliases: Vec<Alias>,
}
