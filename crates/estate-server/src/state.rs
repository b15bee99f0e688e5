//! Application state.

use std::sync::Arc;

use estate_cache::CacheFacade;

use crate::repository::{InMemoryRepository, PropertyRepository};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of truth for listings.
    repository: Arc<dyn PropertyRepository>,
    cache: CacheFacade,
}

impl AppState {
    pub fn new(repository: Arc<dyn PropertyRepository>, cache: CacheFacade) -> Self {
        Self { repository, cache }
    }

    /// Empty in-memory repository behind an in-process cache.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRepository::new()), CacheFacade::in_memory())
    }

    pub fn repository(&self) -> &dyn PropertyRepository {
        self.repository.as_ref()
    }

    pub fn cache(&self) -> &CacheFacade {
        &self.cache
    }
}
