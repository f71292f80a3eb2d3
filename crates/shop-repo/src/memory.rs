use std::sync::Arc;

use async_trait::async_trait;
use shop_types::domain::entity::Entity;
use shop_types::ports::repository::{EntityStore, StoreError};
use tokio::sync::Mutex;

/// Process-local store; holds the last saved snapshot and nothing else.
#[derive(Clone)]
pub struct MemoryStore<E> {
    snapshot: Arc<Mutex<Vec<E>>>,
}

impl<E: Entity> MemoryStore<E> {
    pub fn new() -> Self {
        Self::seeded(Vec::new())
    }

    pub fn seeded(items: Vec<E>) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(items)),
        }
    }

    pub async fn snapshot(&self) -> Vec<E> {
        self.snapshot.lock().await.clone()
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for MemoryStore<E> {
    async fn load(&self) -> Result<Vec<E>, StoreError> {
        Ok(self.snapshot.lock().await.clone())
    }

    async fn save(&self, items: &[E]) -> Result<(), StoreError> {
        *self.snapshot.lock().await = items.to_vec();
        Ok(())
    }
}
