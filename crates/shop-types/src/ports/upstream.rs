//! Outbound calls one service makes to another.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entity::EntityId;

#[derive(thiserror::Error, Debug)]
pub enum UpstreamError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRequest {
    pub order_id: EntityId,
    pub user_id: EntityId,
    pub amount: f64,
}

impl PaymentRequest {
    /// Stable per order so a duplicate delivery can be recognised downstream.
    pub fn idempotency_key(&self) -> String {
        format!("order-{}-payment", self.order_id)
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn request_payment(&self, request: &PaymentRequest) -> Result<(), UpstreamError>;
}

/// Removes records owned by a user in other services.
#[async_trait]
pub trait UserDataCleanup: Send + Sync + 'static {
    async fn purge_user(&self, user_id: EntityId) -> Result<(), UpstreamError>;
}
