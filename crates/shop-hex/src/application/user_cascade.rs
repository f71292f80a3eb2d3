use std::sync::Arc;

use async_trait::async_trait;
use shop_types::domain::user::User;
use shop_types::ports::upstream::UserDataCleanup;

use super::entity_service::Lifecycle;

/// Best-effort removal of a deleted user's records in other services.
/// A failed downstream delete is logged; the user stays deleted.
pub struct CascadeOnDelete {
    cleanup: Arc<dyn UserDataCleanup>,
}

impl CascadeOnDelete {
    pub fn new(cleanup: Arc<dyn UserDataCleanup>) -> Self {
        Self { cleanup }
    }
}

#[async_trait]
impl Lifecycle<User> for CascadeOnDelete {
    async fn deleted(&self, user: &User) {
        match self.cleanup.purge_user(user.id).await {
            Ok(()) => tracing::info!(user_id = user.id, "cascade delete completed"),
            Err(e) => tracing::warn!(user_id = user.id, error = %e, "cascade delete failed"),
        }
    }
}
