use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{require_positive, require_text, Entity, EntityId, StatusUpdate, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Shipped,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Delivery {
    pub id: EntityId,
    pub user_id: EntityId,
    pub order_id: EntityId,
    pub address: String,
    pub tracking_id: String,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDelivery {
    pub user_id: EntityId,
    pub order_id: EntityId,
    pub address: String,
    #[serde(default)]
    pub tracking_id: Option<String>,
}

fn generate_tracking_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("TRK-{}", raw[..12].to_uppercase())
}

impl Entity for Delivery {
    const KIND: &'static str = "delivery";
    const COLLECTION: &'static str = "deliveries";
    const USER_SCOPED: bool = true;

    type Create = NewDelivery;
    type Update = StatusUpdate<DeliveryStatus>;

    fn build(id: EntityId, input: NewDelivery, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        require_positive("user_id", input.user_id)?;
        require_positive("order_id", input.order_id)?;
        require_text("address", &input.address)?;
        let tracking_id = match input.tracking_id {
            Some(t) if !t.trim().is_empty() => t,
            _ => generate_tracking_id(),
        };
        Ok(Self {
            id,
            user_id: input.user_id,
            order_id: input.order_id,
            address: input.address,
            tracking_id,
            status: DeliveryStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, update: StatusUpdate<DeliveryStatus>) -> Result<(), ValidationError> {
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

    fn input(tracking_id: Option<&str>) -> NewDelivery {
        NewDelivery {
            user_id: 1,
            order_id: 2,
            address: "1 Main St".into(),
            tracking_id: tracking_id.map(Into::into),
        }
    }

    #[test]
    fn keeps_supplied_tracking_id() {
        let d = Delivery::build(1, input(Some("TRK-1")), Utc::now()).unwrap();
        assert_eq!(d.tracking_id, "TRK-1");
        assert_eq!(d.status, DeliveryStatus::Pending);
    }

    #[test]
    fn generates_tracking_id_when_missing() {
        let d = Delivery::build(1, input(None), Utc::now()).unwrap();
        assert!(d.tracking_id.starts_with("TRK-"));
        assert_eq!(d.tracking_id.len(), 16);
    }

    #[test]
    fn empty_address_rejected() {
        let mut bad = input(None);
        bad.address = "".into();
        assert!(Delivery::build(1, bad, Utc::now()).is_err());
    }
}
