//! In-memory store with call recording and failure injection.
//!
//! Stands in for the remote service in tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use crate::domain::{Alias, AliasMetadata, AliasState, Item, NewAlias};
use crate::infrastructure::cancel::CancelToken;
use crate::infrastructure::traits::{AliasStore, ItemStore, StoreError, StoreResult};

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FetchAlias(String),
    FetchGroup(String),
    ListAliases,
    CreateAlias(String),
    UpdateState(String, AliasState),
    UpdateMetadata(String),
    FetchItems(Vec<String>),
    DeleteItem(String),
    MoveItem(String, String),
    SetRead(String, bool),
}

impl StoreCall {
    /// Whether the call changes remote state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            StoreCall::FetchAlias(_)
                | StoreCall::FetchGroup(_)
                | StoreCall::ListAliases
                | StoreCall::FetchItems(_)
        )
    }
}

#[derive(Default)]
struct State {
    aliases: Vec<Alias>,
    items: Vec<Item>,
    failures: HashMap<String, StoreError>,
    calls: Vec<StoreCall>,
    interrupt_after: Option<(usize, Interrupt)>,
}

type Interrupt = Box<dyn Fn() + Send>;

/// In-memory alias and item store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aliases(aliases: Vec<Alias>) -> Self {
        let store = Self::new();
        store.lock().aliases = aliases;
        store
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        let store = Self::new();
        store.lock().items = items;
        store
    }

    /// Make every mutating call on `id` fail with `error`.
    pub fn fail_on(&self, id: &str, error: StoreError) {
        self.lock().failures.insert(id.to_string(), error);
    }

    /// Cancel `token` when mutating call number `n + 1` arrives.
    pub fn cancel_after(&self, n: usize, token: CancelToken) {
        self.interrupt_after(n, move || token.cancel());
    }

    /// Run `interrupt` once, when mutation `n + 1` starts.
    pub fn interrupt_after(&self, n: usize, interrupt: impl Fn() + Send + 'static) {
        self.lock().interrupt_after = Some((n, Box::new(interrupt)));
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Mutating calls so far, in order.
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    pub fn alias(&self, id: &str) -> Option<Alias> {
        self.lock().aliases.iter().find(|a| a.id == id).cloned()
    }

    pub fn item(&self, id: &str) -> Option<Item> {
        self.lock().items.iter().find(|i| i.id == id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a mutating call and decide whether it may proceed.
    fn begin_mutation(
        state: &mut State,
        call: StoreCall,
        id: &str,
        cancel: &CancelToken,
    ) -> StoreResult<()> {
        debug!("memory store: {:?}", call);
        state.calls.push(call);
        let made = state.calls.iter().filter(|c| c.is_mutation()).count();
        if state.interrupt_after.as_ref().is_some_and(|(n, _)| made > *n) {
            if let Some((_, interrupt)) = state.interrupt_after.take() {
                interrupt();
            }
        }
        cancel.check()?;
        if let Some(err) = state.failures.get(id) {
            return Err(err.clone());
        }
        Ok(())
    }
}

impl AliasStore for MemoryStore {
    fn fetch_alias(&self, id: &str, cancel: &CancelToken) -> StoreResult<Alias> {
        let mut state = self.lock();
        state.calls.push(StoreCall::FetchAlias(id.to_string()));
        cancel.check()?;
        state
            .aliases
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("alias {id}")))
    }

    fn fetch_group(&self, domain: &str, cancel: &CancelToken) -> StoreResult<Vec<Alias>> {
        let mut state = self.lock();
        state.calls.push(StoreCall::FetchGroup(domain.to_string()));
        cancel.check()?;
        Ok(state
            .aliases
            .iter()
            .filter(|a| a.domain == domain)
            .cloned()
            .collect())
    }

    fn list_aliases(&self, cancel: &CancelToken) -> StoreResult<Vec<Alias>> {
        let mut state = self.lock();
        state.calls.push(StoreCall::ListAliases);
        cancel.check()?;
        Ok(state.aliases.clone())
    }

    fn create_alias(&self, alias: &NewAlias, cancel: &CancelToken) -> StoreResult<Alias> {
        let mut state = self.lock();
        let id = format!("alias-{}", uuid::Uuid::new_v4().simple());
        Self::begin_mutation(
            &mut state,
            StoreCall::CreateAlias(alias.domain.clone()),
            &alias.domain,
            cancel,
        )?;
        let created = Alias {
            email: format!("{}@alias.invalid", &id[6..14]),
            id,
            domain: alias.domain.clone(),
            state: alias.state.clone().unwrap_or(AliasState::Pending),
            description: alias.description.clone(),
            created_at: Utc::now(),
            last_message_at: None,
        };
        state.aliases.push(created.clone());
        Ok(created)
    }

    fn update_state(
        &self,
        id: &str,
        target: &AliasState,
        cancel: &CancelToken,
    ) -> StoreResult<()> {
        let mut state = self.lock();
        Self::begin_mutation(
            &mut state,
            StoreCall::UpdateState(id.to_string(), target.clone()),
            id,
            cancel,
        )?;
        let alias = state
            .aliases
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("alias {id}")))?;
        if alias.state == AliasState::Deleted && *target != AliasState::Deleted {
            return Err(StoreError::Rejected {
                status: 409,
                message: "alias is deleted".into(),
            });
        }
        alias.state = target.clone();
        Ok(())
    }

    fn update_metadata(
        &self,
        id: &str,
        fields: &AliasMetadata,
        cancel: &CancelToken,
    ) -> StoreResult<()> {
        let mut state = self.lock();
        Self::begin_mutation(
            &mut state,
            StoreCall::UpdateMetadata(id.to_string()),
            id,
            cancel,
        )?;
        let alias = state
            .aliases
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("alias {id}")))?;
        if let Some(description) = &fields.description {
            alias.description = description.clone();
        }
        Ok(())
    }
}

impl ItemStore for MemoryStore {
    fn fetch_items(&self, ids: &[String], cancel: &CancelToken) -> StoreResult<Vec<Item>> {
        let mut state = self.lock();
        state.calls.push(StoreCall::FetchItems(ids.to_vec()));
        cancel.check()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.items.iter().find(|i| &i.id == id).cloned())
            .collect())
    }

    fn delete_item(&self, id: &str, cancel: &CancelToken) -> StoreResult<()> {
        let mut state = self.lock();
        Self::begin_mutation(&mut state, StoreCall::DeleteItem(id.to_string()), id, cancel)?;
        let before = state.items.len();
        state.items.retain(|i| i.id != id);
        if state.items.len() == before {
            return Err(StoreError::NotFound(format!("item {id}")));
        }
        Ok(())
    }

    fn move_item(&self, id: &str, mailbox: &str, cancel: &CancelToken) -> StoreResult<()> {
        let mut state = self.lock();
        Self::begin_mutation(
            &mut state,
            StoreCall::MoveItem(id.to_string(), mailbox.to_string()),
            id,
            cancel,
        )?;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("item {id}")))?;
        item.mailbox = mailbox.to_string();
        Ok(())
    }

    fn set_read(&self, id: &str, read: bool, cancel: &CancelToken) -> StoreResult<()> {
        let mut state = self.lock();
        Self::begin_mutation(&mut state, StoreCall::SetRead(id.to_string(), read), id, cancel)?;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("item {id}")))?;
        item.read = read;
        Ok(())
    }
}
