use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use shop_types::domain::entity::Entity;
use shop_types::ports::repository::EntityStore;

pub mod file;
pub mod memory;
pub mod repository;

pub use repository::Repository;

/// Where a service keeps its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Memory,
    File(PathBuf),
}

pub async fn build_repo<E: Entity>(backend: &Backend) -> anyhow::Result<Repository<E>> {
    let store: Arc<dyn EntityStore<E>> = match backend {
        Backend::Memory => Arc::new(memory::MemoryStore::<E>::new()),
        Backend::File(path) => Arc::new(file::JsonFile::new(path.clone())),
    };
    Repository::open(store)
        .await
        .with_context(|| format!("failed to open {} repository ({backend:?})", E::KIND))
}
