use std::sync::Arc;

use async_trait::async_trait;
use shop_types::domain::entity::{Entity, EntityId};
use shop_types::ports::repository::EntityRepository;

use crate::errors::AppError;

/// Side effects that follow a committed change. Hooks run after the
/// repository has persisted the change and cannot fail the request.
#[async_trait]
pub trait Lifecycle<E: Entity>: Send + Sync + 'static {
    async fn created(&self, _entity: &E) {}

    async fn deleted(&self, _entity: &E) {}
}

pub struct EntityService<E: Entity> {
    repo: Arc<dyn EntityRepository<E>>,
    hooks: Vec<Arc<dyn Lifecycle<E>>>,
}

impl<E: Entity> EntityService<E> {
    pub fn new(repo: Arc<dyn EntityRepository<E>>) -> Self {
        Self {
            repo,
            hooks: Vec::new(),
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn Lifecycle<E>>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub async fn create(&self, input: E::Create) -> Result<E, AppError> {
        let entity = self.repo.create(input).await?;
        tracing::info!(kind = E::KIND, id = entity.id(), "created");
        for hook in &self.hooks {
            hook.created(&entity).await;
        }
        Ok(entity)
    }

    pub async fn get(&self, id: EntityId) -> Result<E, AppError> {
        Ok(self.repo.get(id).await?)
    }

    pub async fn list(&self) -> Result<Vec<E>, AppError> {
        Ok(self.repo.list().await?)
    }

    pub async fn list_by_user(&self, user_id: EntityId) -> Result<Vec<E>, AppError> {
        Ok(self.repo.list_by_owner(user_id).await?)
    }

    pub async fn update(&self, id: EntityId, update: E::Update) -> Result<E, AppError> {
        Ok(self.repo.update(id, update).await?)
    }

    pub async fn delete(&self, id: EntityId) -> Result<(), AppError> {
        let removed = self.repo.delete(id).await?;
        tracing::info!(kind = E::KIND, id, "deleted");
        for hook in &self.hooks {
            hook.deleted(&removed).await;
        }
        Ok(())
    }

    pub async fn delete_by_user(&self, user_id: EntityId) -> Result<usize, AppError> {
        let removed = self.repo.delete_by_owner(user_id).await?;
        tracing::info!(kind = E::KIND, user_id, count = removed.len(), "deleted for user");
        for entity in &removed {
            for hook in &self.hooks {
                hook.deleted(entity).await;
            }
        }
        Ok(removed.len())
    }

    pub async fn exists(&self, id: EntityId) -> bool {
        self.repo.exists(id).await
    }
}
