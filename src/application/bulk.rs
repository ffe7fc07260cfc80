//! Bulk mutation engine
//!
//! Applies one mutation to many remote members, isolating per-member failure.
//!
//! ```text
//! members ──filter──> pending ──dry run──> DryRunPlan
//!    │                   │
//!    │ (none pending)    └──apply_each──> BulkOperationResult
//!    └──> all members succeeded, zero store calls
//! ```
//!
//! Members are processed sequentially in input order, one store call each.
//! A failed call is recorded and processing continues; nothing is retried
//! or rolled back.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::infrastructure::traits::{StoreError, StoreResult};

/// Classification of a per-member failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Cancelled,
    Timeout,
    Transport,
    Rejected,
    InvalidResponse,
}

impl From<&StoreError> for FailureKind {
    fn from(err: &StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => FailureKind::NotFound,
            StoreError::Cancelled => FailureKind::Cancelled,
            StoreError::DeadlineExceeded => FailureKind::Timeout,
            StoreError::Transport(_) => FailureKind::Transport,
            StoreError::Rejected { .. } => FailureKind::Rejected,
            StoreError::Decode(_) => FailureKind::InvalidResponse,
        }
    }
}

/// One failed member of a bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    pub kind: FailureKind,
    pub item_id: String,
    pub message: String,
}

impl ItemFailure {
    pub fn new(kind: FailureKind, item_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            item_id: item_id.into(),
            message: message.into(),
        }
    }

    pub fn from_store_error(item_id: &str, err: &StoreError) -> Self {
        Self::new(FailureKind::from(err), item_id, err.to_string())
    }
}

/// Aggregate outcome of applying a mutation to many members.
///
/// Every submitted member ends up in exactly one of `succeeded` and `failed`,
/// both kept in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOperationResult {
    pub succeeded: Vec<String>,
    pub failed: Vec<ItemFailure>,
}

impl BulkOperationResult {
    /// Result where every id counts as succeeded without any call being made.
    pub fn all_succeeded<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            succeeded: ids.into_iter().map(Into::into).collect(),
            failed: Vec::new(),
        }
    }

    pub fn record_success(&mut self, id: &str) {
        self.succeeded.push(id.to_string());
    }

    pub fn record_failure(&mut self, id: &str, err: &StoreError) {
        self.failed.push(ItemFailure::from_store_error(id, err));
    }

    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Whether `ids` are exactly the recorded members, each recorded once.
    pub fn accounts_for(&self, ids: &[String]) -> bool {
        let mut recorded: Vec<&str> = self
            .succeeded
            .iter()
            .map(String::as_str)
            .chain(self.failed.iter().map(|f| f.item_id.as_str()))
            .collect();
        let mut expected: Vec<&str> = ids.iter().map(String::as_str).collect();
        recorded.sort_unstable();
        expected.sort_unstable();
        recorded == expected
    }
}

/// One member a mutation would touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub id: String,
    pub current_state: String,
    pub new_state: String,
}

/// Ordered preview of a bulk mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DryRunPlan {
    pub entries: Vec<PlanEntry>,
}

impl DryRunPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }
}

/// How a particular mutation reads and changes a member.
pub trait Mutation<T> {
    /// Identifier reported for the member.
    fn member_id<'a>(&self, member: &'a T) -> &'a str;

    /// Whether the member already satisfies the mutation.
    fn is_satisfied(&self, member: &T) -> bool;

    /// The member's current state, for previews.
    fn current_state(&self, member: &T) -> String;

    /// The state the mutation produces, for previews.
    fn target_state(&self) -> String;

    /// Perform the mutation with one store call.
    fn apply(&self, member: &T) -> StoreResult<()>;
}

/// Outcome of [`execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkRun {
    Preview(DryRunPlan),
    Applied(BulkOperationResult),
}

/// Members that still need the mutation, in input order.
pub fn pending_members<'a, T, M: Mutation<T>>(members: &'a [T], mutation: &M) -> Vec<&'a T> {
    members.iter().filter(|m| !mutation.is_satisfied(m)).collect()
}

/// Preview over exactly the members a real run would attempt.
pub fn plan<T, M: Mutation<T>>(pending: &[&T], mutation: &M) -> DryRunPlan {
    let new_state = mutation.target_state();
    DryRunPlan {
        entries: pending
            .iter()
            .map(|m| PlanEntry {
                id: mutation.member_id(m).to_string(),
                current_state: mutation.current_state(m),
                new_state: new_state.clone(),
            })
            .collect(),
    }
}

/// Apply the mutation to every pending member, one call each, never stopping early.
pub fn apply_each<T, M: Mutation<T>>(pending: &[&T], mutation: &M) -> BulkOperationResult {
    let mut result = BulkOperationResult::default();
    for member in pending {
        let id = mutation.member_id(member);
        match mutation.apply(member) {
            Ok(()) => {
                debug!("apply_each: {} ok", id);
                result.record_success(id);
            }
            Err(e) => {
                warn!("apply_each: {} failed: {}", id, e);
                result.record_failure(id, &e);
            }
        }
    }
    result
}

/// Run a bulk mutation over `members`.
///
/// With nothing pending, every member counts as succeeded and no mutating
/// call is made, in both modes. Otherwise a dry run returns the plan and a
/// real run applies the mutation member by member.
pub fn execute<T, M: Mutation<T>>(members: &[T], mutation: &M, dry_run: bool) -> BulkRun {
    let pending = pending_members(members, mutation);
    info!(
        "bulk: {} members, {} pending, dry_run={}",
        members.len(),
        pending.len(),
        dry_run
    );

    if pending.is_empty() {
        return BulkRun::Applied(BulkOperationResult::all_succeeded(
            members.iter().map(|m| mutation.member_id(m)),
        ));
    }
    if dry_run {
        return BulkRun::Preview(plan(&pending, mutation));
    }
    BulkRun::Applied(apply_each(&pending, mutation))
}
