//! Bulk mail item mutations: delete, move, mark read/unread.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::bulk::{self, BulkRun, Mutation};
use crate::application::context::RequestContext;
use crate::application::outcome::{ItemAction, ItemOutcome, ItemPreview, ItemReport};
use crate::application::{ApplicationResult, StoreResultExt};
use crate::domain::target::validate_ids;
use crate::domain::{Item, ItemMutation};
use crate::infrastructure::traits::{ItemStore, StoreResult};
use crate::infrastructure::CancelToken;

/// A requested id and the item fetched for it, if the store knows it.
#[derive(Debug, Clone)]
struct ItemRef {
    id: String,
    item: Option<Item>,
}

/// Applies one `ItemMutation` per item.
struct ApplyItemMutation<'a> {
    store: &'a dyn ItemStore,
    mutation: &'a ItemMutation,
    cancel: &'a CancelToken,
}

impl Mutation<ItemRef> for ApplyItemMutation<'_> {
    fn member_id<'m>(&self, member: &'m ItemRef) -> &'m str {
        &member.id
    }

    fn is_satisfied(&self, member: &ItemRef) -> bool {
        member
            .item
            .as_ref()
            .is_some_and(|item| self.mutation.is_satisfied_by(item))
    }

    fn current_state(&self, member: &ItemRef) -> String {
        member
            .item
            .as_ref()
            .map(|item| self.mutation.current_state(item))
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn target_state(&self) -> String {
        self.mutation.target_state()
    }

    fn apply(&self, member: &ItemRef) -> StoreResult<()> {
        match self.mutation {
            ItemMutation::Delete => self.store.delete_item(&member.id, self.cancel),
            ItemMutation::Move { mailbox } => self.store.move_item(&member.id, mailbox, self.cancel),
            ItemMutation::SetRead(read) => self.store.set_read(&member.id, *read, self.cancel),
        }
    }
}

impl ItemAction {
    /// Verb forms and qualifier describing `mutation`.
    pub fn for_mutation(mutation: &ItemMutation) -> Self {
        match mutation {
            ItemMutation::Delete => ItemAction {
                verb: "delete",
                past: "Deleted",
                qualifier: String::new(),
            },
            ItemMutation::Move { mailbox } => ItemAction {
                verb: "move",
                past: "Moved",
                qualifier: format!("to {mailbox}"),
            },
            ItemMutation::SetRead(true) => ItemAction {
                verb: "mark",
                past: "Marked",
                qualifier: "as read".to_string(),
            },
            ItemMutation::SetRead(false) => ItemAction {
                verb: "mark",
                past: "Marked",
                qualifier: "as unread".to_string(),
            },
        }
    }
}

/// Bulk mail item service.
pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    /// Create a new item service.
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub fn delete(&self, ctx: &RequestContext, ids: &[String]) -> ApplicationResult<ItemOutcome> {
        self.run(ctx, ids, ItemMutation::Delete)
    }

    pub fn move_to(
        &self,
        ctx: &RequestContext,
        ids: &[String],
        mailbox: &str,
    ) -> ApplicationResult<ItemOutcome> {
        let mailbox = crate::domain::target::validate_mailbox(mailbox)?;
        self.run(ctx, ids, ItemMutation::Move { mailbox })
    }

    pub fn mark_read(
        &self,
        ctx: &RequestContext,
        ids: &[String],
        read: bool,
    ) -> ApplicationResult<ItemOutcome> {
        self.run(ctx, ids, ItemMutation::SetRead(read))
    }

    /// Fetch current state for `ids`, then run the mutation through the bulk engine.
    ///
    /// Ids the store does not return are still attempted; their failure, if
    /// any, is recorded against them.
    #[instrument(skip(self, ctx), fields(dry_run = ctx.dry_run))]
    fn run(
        &self,
        ctx: &RequestContext,
        ids: &[String],
        mutation: ItemMutation,
    ) -> ApplicationResult<ItemOutcome> {
        let ids = validate_ids(ids)?;
        let fetched = self
            .store
            .fetch_items(&ids, &ctx.cancel)
            .with_operation("fetch items")?;
        debug!("run: {} of {} ids known to store", fetched.len(), ids.len());

        let members: Vec<ItemRef> = ids
            .into_iter()
            .map(|id| {
                let item = fetched.iter().find(|i| i.id == id).cloned();
                ItemRef { id, item }
            })
            .collect();

        let action = ItemAction::for_mutation(&mutation);
        let apply = ApplyItemMutation {
            store: self.store.as_ref(),
            mutation: &mutation,
            cancel: &ctx.cancel,
        };
        Ok(match bulk::execute(&members, &apply, ctx.dry_run) {
            BulkRun::Preview(plan) => ItemOutcome::Preview(ItemPreview {
                action,
                dry_run: true,
                count: plan.len(),
                items: plan.entries,
            }),
            BulkRun::Applied(result) => ItemOutcome::Applied(ItemReport {
                action,
                dry_run: ctx.dry_run,
                result,
            }),
        })
    }
}
