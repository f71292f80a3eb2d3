use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use shop_types::domain::entity::{Entity, EntityId};
use shop_types::ports::repository::{
    EntityRepository, EntityStore, Mutation, RepoError, StoreError,
};
use tokio::sync::RwLock;

use crate::memory::MemoryStore;

struct State<E> {
    rows: BTreeMap<EntityId, E>,
    next_id: EntityId,
}

impl<E> Default for State<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// Id-keyed records of one kind behind a single reader/writer lock.
///
/// Every mutation rewrites the whole set through the store while the write
/// lock is held. When the store rejects the write the in-memory change is
/// undone, so the map never runs ahead of what was persisted. Ids are handed
/// out from a counter that only moves forward.
pub struct Repository<E: Entity> {
    state: RwLock<State<E>>,
    store: Arc<dyn EntityStore<E>>,
}

impl<E: Entity> Repository<E> {
    pub async fn open(store: Arc<dyn EntityStore<E>>) -> Result<Self, RepoError> {
        store.prepare().await?;
        let mut state = State::default();
        for item in store.load().await? {
            let id = item.id();
            if id <= 0 {
                return Err(corrupt::<E>(format!("non-positive id {id}")));
            }
            let after = id
                .checked_add(1)
                .ok_or_else(|| corrupt::<E>(format!("id {id} leaves no room for new ids")))?;
            if state.rows.insert(id, item).is_some() {
                return Err(corrupt::<E>(format!("duplicate id {id}")));
            }
            state.next_id = state.next_id.max(after);
        }
        tracing::info!(
            kind = E::KIND,
            rows = state.rows.len(),
            next_id = state.next_id,
            "repository loaded"
        );
        Ok(Self {
            state: RwLock::new(state),
            store,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(State::default()),
            store: Arc::new(MemoryStore::<E>::new()),
        }
    }

    async fn persist(&self, state: &State<E>) -> Result<(), StoreError> {
        let items: Vec<E> = state.rows.values().cloned().collect();
        self.store.save(&items).await.map_err(|e| {
            tracing::error!(kind = E::KIND, error = %e, "failed to persist");
            e
        })
    }
}

fn corrupt<E: Entity>(reason: String) -> RepoError {
    tracing::error!(kind = E::KIND, %reason, "id invariant violated");
    RepoError::Storage(StoreError::Corrupt(reason))
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for Repository<E> {
    async fn create(&self, input: E::Create) -> Result<E, RepoError> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        let next_id = id
            .checked_add(1)
            .ok_or_else(|| corrupt::<E>("id space exhausted".into()))?;
        let entity = E::build(id, input, Utc::now())?;
        for other in state.rows.values() {
            entity.check_unique(other)?;
        }

        state.next_id = next_id;
        state.rows.insert(id, entity.clone());
        if let Err(e) = self.persist(&state).await {
            state.rows.remove(&id);
            return Err(e.into());
        }
        tracing::debug!(kind = E::KIND, id, "created");
        Ok(entity)
    }

    async fn get(&self, id: EntityId) -> Result<E, RepoError> {
        let state = self.state.read().await;
        state
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found::<E>(id))
    }

    async fn list(&self) -> Result<Vec<E>, RepoError> {
        let state = self.state.read().await;
        Ok(state.rows.values().cloned().collect())
    }

    async fn list_by_owner(&self, owner_id: EntityId) -> Result<Vec<E>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|e| e.owner_id() == Some(owner_id))
            .cloned()
            .collect())
    }

    async fn update_with(&self, id: EntityId, mutation: Mutation<E>) -> Result<E, RepoError> {
        let mut state = self.state.write().await;
        let current = state
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found::<E>(id))?;

        let mut next = current.clone();
        mutation(&mut next)?;
        next.touch(Utc::now());
        for other in state.rows.values() {
            next.check_unique(other)?;
        }

        state.rows.insert(id, next.clone());
        if let Err(e) = self.persist(&state).await {
            state.rows.insert(id, current);
            return Err(e.into());
        }
        tracing::debug!(kind = E::KIND, id, "updated");
        Ok(next)
    }

    async fn delete(&self, id: EntityId) -> Result<E, RepoError> {
        let mut state = self.state.write().await;
        let removed = state
            .rows
            .remove(&id)
            .ok_or_else(|| RepoError::not_found::<E>(id))?;
        if let Err(e) = self.persist(&state).await {
            state.rows.insert(id, removed);
            return Err(e.into());
        }
        tracing::debug!(kind = E::KIND, id, "deleted");
        Ok(removed)
    }

    async fn delete_by_owner(&self, owner_id: EntityId) -> Result<Vec<E>, RepoError> {
        let mut state = self.state.write().await;
        let ids: Vec<EntityId> = state
            .rows
            .values()
            .filter(|e| e.owner_id() == Some(owner_id))
            .map(|e| e.id())
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let removed: Vec<E> = ids.iter().filter_map(|id| state.rows.remove(id)).collect();
        if let Err(e) = self.persist(&state).await {
            for row in &removed {
                state.rows.insert(row.id(), row.clone());
            }
            return Err(e.into());
        }
        tracing::debug!(kind = E::KIND, owner_id, removed = removed.len(), "deleted by owner");
        Ok(removed)
    }

    async fn exists(&self, id: EntityId) -> bool {
        self.state.read().await.rows.contains_key(&id)
    }
}
