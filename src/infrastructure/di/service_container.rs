//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{AliasService, ItemService};
use crate::config::Settings;
use crate::infrastructure::http::HttpStore;
use crate::infrastructure::traits::{AliasStore, ItemStore};
use crate::infrastructure::InfraResult;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Alias side of the remote service
    pub aliases: Arc<dyn AliasStore>,

    /// Mail item side of the remote service
    pub items: Arc<dyn ItemStore>,
}

impl ServiceContainer {
    /// Create a new service container talking to the configured service.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let store = Arc::new(HttpStore::new(&settings)?);
        Ok(Self::with_deps(settings, store.clone(), store))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        aliases: Arc<dyn AliasStore>,
        items: Arc<dyn ItemStore>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            aliases,
            items,
        }
    }

    pub fn alias_service(&self) -> AliasService {
        AliasService::new(self.aliases.clone())
    }

    pub fn item_service(&self) -> ItemService {
        ItemService::new(self.items.clone())
    }
}
