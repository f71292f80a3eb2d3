use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{require_amount, require_positive, Entity, EntityId, StatusUpdate, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    PaymentPending,
    PaymentFailed,
    Paid,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: EntityId,
    pub user_id: EntityId,
    pub items: Vec<String>,
    pub amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: EntityId,
    pub items: Vec<String>,
    #[serde(default)]
    pub amount: f64,
}

impl Order {
    pub fn update_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now().max(self.created_at);
    }
}

impl Entity for Order {
    const KIND: &'static str = "order";
    const COLLECTION: &'static str = "orders";
    const USER_SCOPED: bool = true;

    type Create = NewOrder;
    type Update = StatusUpdate<OrderStatus>;

    fn build(id: EntityId, input: NewOrder, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        require_positive("user_id", input.user_id)?;
        if input.items.is_empty() {
            return Err(ValidationError::invalid("items empty"));
        }
        if input.items.iter().any(|it| it.trim().is_empty()) {
            return Err(ValidationError::invalid("item names must not be empty"));
        }
        require_amount(input.amount)?;
        Ok(Self {
            id,
            user_id: input.user_id,
            items: input.items,
            amount: input.amount,
            status: OrderStatus::Created,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, update: StatusUpdate<OrderStatus>) -> Result<(), ValidationError> {
        self.status = update.status;
        Ok(())
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn owner_id(&self) -> Option<EntityId> {
        Some(self.user_id)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}
