//! Order creation asks the payments service for a payment on a detached task.
//!
//! The order is already persisted and visible when the task starts. The task
//! makes exactly one outbound call and records its outcome on the order:
//! `payment_pending` when the payments service accepted the request,
//! `payment_failed` otherwise. Until then readers see `created`.

use std::sync::Arc;

use async_trait::async_trait;
use shop_types::domain::entity::ValidationError;
use shop_types::domain::order::{Order, OrderStatus};
use shop_types::ports::repository::{EntityRepository, RepoError};
use shop_types::ports::upstream::{PaymentGateway, PaymentRequest};
use tokio::task::JoinHandle;

use super::entity_service::Lifecycle;

pub struct PaymentKickoff {
    orders: Arc<dyn EntityRepository<Order>>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentKickoff {
    pub fn new(orders: Arc<dyn EntityRepository<Order>>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { orders, gateway }
    }

    pub fn spawn(&self, order: &Order) -> JoinHandle<()> {
        let orders = self.orders.clone();
        let gateway = self.gateway.clone();
        let request = PaymentRequest {
            order_id: order.id,
            user_id: order.user_id,
            amount: order.amount,
        };
        tokio::spawn(async move { settle(orders, gateway, request).await })
    }
}

async fn settle(
    orders: Arc<dyn EntityRepository<Order>>,
    gateway: Arc<dyn PaymentGateway>,
    request: PaymentRequest,
) {
    let order_id = request.order_id;
    let outcome = match gateway.request_payment(&request).await {
        Ok(()) => OrderStatus::PaymentPending,
        Err(e) => {
            tracing::warn!(order_id, error = %e, "payment request failed");
            OrderStatus::PaymentFailed
        }
    };

    let mark = Box::new(move |order: &mut Order| {
        if order.status != OrderStatus::Created {
            return Err(ValidationError::invalid(format!(
                "order already moved to {:?}",
                order.status
            )));
        }
        order.update_status(outcome);
        Ok(())
    });
    match orders.update_with(order_id, mark).await {
        Ok(order) => tracing::info!(order_id, status = ?order.status, "payment outcome recorded"),
        Err(RepoError::NotFound { .. }) => {
            tracing::debug!(order_id, "order gone before payment outcome landed")
        }
        Err(RepoError::Validation(reason)) => {
            tracing::debug!(order_id, %reason, "payment outcome skipped")
        }
        Err(e) => tracing::error!(order_id, error = %e, "failed to record payment outcome"),
    }
}

#[async_trait]
impl Lifecycle<Order> for PaymentKickoff {
    async fn created(&self, order: &Order) {
        self.spawn(order);
    }
}
