use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{require_amount, require_positive, Entity, EntityId, StatusUpdate, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: EntityId,
    pub order_id: EntityId,
    pub user_id: EntityId,
    pub amount: f64,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPayment {
    pub order_id: EntityId,
    pub user_id: EntityId,
    pub amount: f64,
}

impl Entity for Payment {
    const KIND: &'static str = "payment";
    const COLLECTION: &'static str = "payments";
    const USER_SCOPED: bool = true;

    type Create = NewPayment;
    type Update = StatusUpdate<PaymentStatus>;

    fn build(id: EntityId, input: NewPayment, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        require_positive("order_id", input.order_id)?;
        require_positive("user_id", input.user_id)?;
        require_amount(input.amount)?;
        Ok(Self {
            id,
            order_id: input.order_id,
            user_id: input.user_id,
            amount: input.amount,
            status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, update: StatusUpdate<PaymentStatus>) -> Result<(), ValidationError> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pending_and_validates_ids() {
        let ok = NewPayment {
            order_id: 3,
            user_id: 1,
            amount: 12.5,
        };
        let payment = Payment::build(1, ok.clone(), Utc::now()).unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);

        let missing_order = NewPayment { order_id: 0, ..ok };
        assert!(Payment::build(1, missing_order, Utc::now()).is_err());
    }

    #[test]
    fn extra_status_field_in_request_is_ignored() {
        let body = r#"{"order_id":1,"user_id":2,"amount":5.0,"status":"pending"}"#;
        let input: NewPayment = serde_json::from_str(body).unwrap();
        assert_eq!(input.order_id, 1);
    }
}
