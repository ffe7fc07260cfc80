//! Alias lifecycle service
//!
//! Single-alias transitions, domain-wide bulk transitions, authoritative
//! alias resolution and description updates.
//!
//! ## No-op policy
//!
//! ```text
//! apply_single(id, S)  where alias.state == S  -> AlreadyInState (dry run too)
//! apply_bulk(domain, S) members already in S   -> skipped silently
//! ```
//!
//! A single id names one alias the user expects to change, so a no-op is
//! reported. A domain names a set that should converge to `S`, so members
//! already there are filtered out.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::bulk::{self, BulkRun, Mutation};
use crate::application::context::RequestContext;
use crate::application::outcome::{
    AliasListing, BulkOutcome, CreatePreview, DescriptionChange, GroupPreview, GroupReport,
    ResolveOutcome, ResolvedAlias, SingleOutcome, StateChange, StatePreview,
};
use crate::application::{ApplicationResult, StoreResultExt};
use crate::domain::{
    ensure_transition, select_authoritative, Alias, AliasMetadata, AliasState, DomainError,
    NewAlias,
};
use crate::infrastructure::traits::{AliasStore, StoreError, StoreResult};
use crate::infrastructure::CancelToken;

/// Moves aliases into one target state.
struct SetState<'a> {
    store: &'a dyn AliasStore,
    target: &'a AliasState,
    cancel: &'a CancelToken,
}

impl Mutation<Alias> for SetState<'_> {
    fn member_id<'m>(&self, member: &'m Alias) -> &'m str {
        &member.id
    }

    fn is_satisfied(&self, member: &Alias) -> bool {
        member.state == *self.target
    }

    fn current_state(&self, member: &Alias) -> String {
        member.state.to_string()
    }

    fn target_state(&self) -> String {
        self.target.to_string()
    }

    fn apply(&self, member: &Alias) -> StoreResult<()> {
        self.store.update_state(&member.id, self.target, self.cancel)
    }
}

/// Alias lifecycle service.
pub struct AliasService {
    store: Arc<dyn AliasStore>,
}

impl AliasService {
    /// Create a new alias service.
    pub fn new(store: Arc<dyn AliasStore>) -> Self {
        Self { store }
    }

    fn fetch(&self, id: &str, cancel: &CancelToken) -> ApplicationResult<Alias> {
        match self.store.fetch_alias(id, cancel) {
            Err(StoreError::NotFound(_)) => Err(DomainError::AliasNotFound(id.to_string()).into()),
            other => other.with_operation("fetch alias"),
        }
    }

    fn fetch_group(&self, domain: &str, cancel: &CancelToken) -> ApplicationResult<Vec<Alias>> {
        let members = self
            .store
            .fetch_group(domain, cancel)
            .with_operation("fetch aliases")?;
        debug!("fetch_group: {} has {} aliases", domain, members.len());
        Ok(members)
    }

    /// Change one alias's state.
    ///
    /// Fails with `AlreadyInState` when nothing would change, in dry-run
    /// mode as well. State is read and then written in two separate calls
    /// without a concurrency token.
    #[instrument(skip(self, ctx), fields(dry_run = ctx.dry_run))]
    pub fn apply_single(
        &self,
        ctx: &RequestContext,
        id: &str,
        target: &AliasState,
    ) -> ApplicationResult<SingleOutcome> {
        let alias = self.fetch(id, &ctx.cancel)?;
        ensure_transition(&alias, target)?;

        if ctx.dry_run {
            return Ok(SingleOutcome::Preview(StatePreview {
                dry_run: true,
                id: alias.id,
                current_state: alias.state,
                new_state: target.clone(),
            }));
        }

        self.store
            .update_state(&alias.id, target, &ctx.cancel)
            .with_operation("update state")?;
        info!("apply_single: {} {} -> {}", alias.id, alias.state, target);
        Ok(SingleOutcome::Committed(StateChange {
            id: alias.id,
            state: target.clone(),
        }))
    }

    /// Move every alias of the context's domain into `target`.
    ///
    /// Aborts with `GroupNotFound` when the domain has no aliases. Per-alias
    /// failures are collected in the report; the call itself still succeeds.
    #[instrument(skip(self, ctx), fields(dry_run = ctx.dry_run, domain = ?ctx.group_key))]
    pub fn apply_bulk(
        &self,
        ctx: &RequestContext,
        target: &AliasState,
    ) -> ApplicationResult<BulkOutcome> {
        let domain = ctx.group_key()?;
        let members = self.fetch_group(domain, &ctx.cancel)?;
        if members.is_empty() {
            return Err(DomainError::GroupNotFound(domain.to_string()).into());
        }

        let mutation = SetState {
            store: self.store.as_ref(),
            target,
            cancel: &ctx.cancel,
        };
        match bulk::execute(&members, &mutation, ctx.dry_run) {
            BulkRun::Preview(plan) => Ok(BulkOutcome::Preview(GroupPreview {
                dry_run: true,
                group_key: domain.to_string(),
                target: target.clone(),
                count: plan.len(),
                items: plan.entries,
            })),
            BulkRun::Applied(result) => {
                info!(
                    "apply_bulk: {} succeeded={} failed={}",
                    domain,
                    result.succeeded_count(),
                    result.failed_count()
                );
                Ok(BulkOutcome::Applied(
                    GroupReport::new(domain, target, result).with_dry_run(ctx.dry_run),
                ))
            }
        }
    }

    /// The authoritative alias of the context's domain.
    pub fn show(&self, ctx: &RequestContext) -> ApplicationResult<Alias> {
        let domain = ctx.group_key()?;
        let members = self.fetch_group(domain, &ctx.cancel)?;
        select_authoritative(&members)
            .cloned()
            .ok_or_else(|| DomainError::GroupNotFound(domain.to_string()).into())
    }

    /// Return the domain's authoritative alias, creating one when none is usable.
    ///
    /// A domain whose best alias is deleted counts as having none.
    pub fn get_or_create(
        &self,
        ctx: &RequestContext,
        description: &str,
    ) -> ApplicationResult<ResolveOutcome> {
        let domain = ctx.group_key()?;
        let members = self.fetch_group(domain, &ctx.cancel)?;

        if let Some(best) = select_authoritative(&members) {
            if best.state != AliasState::Deleted {
                return Ok(ResolveOutcome::Resolved(ResolvedAlias {
                    created: false,
                    alias: best.clone(),
                }));
            }
        }

        if ctx.dry_run {
            return Ok(ResolveOutcome::WouldCreate(CreatePreview {
                dry_run: true,
                domain: domain.to_string(),
                description: description.to_string(),
            }));
        }

        let new_alias = NewAlias {
            domain: domain.to_string(),
            description: description.to_string(),
            state: None,
        };
        let alias = self
            .store
            .create_alias(&new_alias, &ctx.cancel)
            .with_operation("create alias")?;
        info!("get_or_create: created {} for {}", alias.id, domain);
        Ok(ResolveOutcome::Resolved(ResolvedAlias {
            created: true,
            alias,
        }))
    }

    /// Replace an alias's description.
    pub fn describe(
        &self,
        ctx: &RequestContext,
        id: &str,
        description: &str,
    ) -> ApplicationResult<DescriptionChange> {
        let alias = self.fetch(id, &ctx.cancel)?;
        let change = DescriptionChange {
            dry_run: ctx.dry_run,
            id: alias.id,
            description: description.to_string(),
        };
        if ctx.dry_run {
            return Ok(change);
        }

        let fields = AliasMetadata {
            description: Some(change.description.clone()),
        };
        self.store
            .update_metadata(&change.id, &fields, &ctx.cancel)
            .with_operation("update description")?;
        Ok(change)
    }

    /// All aliases, optionally narrowed to a domain and a state.
    pub fn list(
        &self,
        ctx: &RequestContext,
        state: Option<&AliasState>,
    ) -> ApplicationResult<AliasListing> {
        let aliases = match ctx.group_key.as_deref() {
            Some(domain) => self.fetch_group(domain, &ctx.cancel)?,
            None => self
                .store
                .list_aliases(&ctx.cancel)
                .with_operation("list aliases")?,
        };
        let aliases = aliases
            .into_iter()
            .filter(|a| state.map_or(true, |s| a.state == *s))
            .collect();
        Ok(AliasListing { aliases })
    }
}

