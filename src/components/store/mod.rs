pub mod backup;
mod file;
pub mod models;

pub use file::JsonFileStore;
pub use models::{AppState, GiftIdea, Person, PersonEvent, Relationship, StandaloneEvent};

use crate::error::MementoResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Key-value blob holding the whole application state
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the current snapshot
    async fn load(&self) -> MementoResult<AppState>;

    /// Replace the stored snapshot
    async fn save(&self, state: &AppState) -> MementoResult<()>;
}

/// Shared handle passed to components
pub type StoreHandle = Arc<dyn StateStore>;

/// Store that keeps the snapshot in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<AppState>,
}

impl MemoryStore {
    /// Create a store seeded with `state`
    pub fn new(state: AppState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> MementoResult<AppState> {
        Ok(self.state.read().await.clone())
    }

    async fn save(&self, state: &AppState) -> MementoResult<()> {
        *self.state.write().await = state.clone();
        Ok(())
    }
}
