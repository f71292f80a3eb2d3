use async_trait::async_trait;

use crate::domain::entity::{Entity, EntityId, ValidationError};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Content parsed but breaks an id invariant.
    #[error("corrupt store: {0}")]
    Corrupt(String),
}

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: EntityId },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl RepoError {
    pub fn not_found<E: Entity>(id: EntityId) -> Self {
        Self::NotFound { kind: E::KIND, id }
    }
}

/// In-place mutation applied by [`EntityRepository::update_with`].
pub type Mutation<E> = Box<dyn FnOnce(&mut E) -> Result<(), ValidationError> + Send>;

/// Where a repository persists its full set of records.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync + 'static {
    /// Make the backing medium ready for the first load.
    async fn prepare(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn load(&self) -> Result<Vec<E>, StoreError>;

    /// Replace the persisted set with `items`.
    async fn save(&self, items: &[E]) -> Result<(), StoreError>;
}

#[async_trait]
pub trait EntityRepository<E: Entity>: Send + Sync + 'static {
    async fn create(&self, input: E::Create) -> Result<E, RepoError>;
    async fn get(&self, id: EntityId) -> Result<E, RepoError>;
    async fn list(&self) -> Result<Vec<E>, RepoError>;
    async fn list_by_owner(&self, owner_id: EntityId) -> Result<Vec<E>, RepoError>;
    async fn update_with(&self, id: EntityId, mutation: Mutation<E>) -> Result<E, RepoError>;
    async fn delete(&self, id: EntityId) -> Result<E, RepoError>;
    async fn delete_by_owner(&self, owner_id: EntityId) -> Result<Vec<E>, RepoError>;
    async fn exists(&self, id: EntityId) -> bool;

    async fn update(&self, id: EntityId, update: E::Update) -> Result<E, RepoError> {
        self.update_with(id, Box::new(move |entity: &mut E| entity.apply(update)))
            .await
    }
}
