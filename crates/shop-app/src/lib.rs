//! Wires one service's repository, hooks and peer clients from `Config`.

use std::sync::Arc;

use axum::Router;
use shop_client::{ServiceClient, UserCascade};
use shop_hex::application::payment_kickoff::PaymentKickoff;
use shop_hex::application::user_cascade::CascadeOnDelete;
use shop_hex::application::EntityService;
use shop_hex::config::{Config, ServiceKind};
use shop_hex::inbound::http::resource_routes;
use shop_repo::{build_repo, Backend};
use shop_types::domain::delivery::Delivery;
use shop_types::domain::order::Order;
use shop_types::domain::payment::Payment;
use shop_types::domain::user::User;

pub fn backend(config: &Config) -> Backend {
    match &config.data_path {
        Some(path) => Backend::File(path.clone()),
        None => Backend::Memory,
    }
}

fn peer(base_url: &str, config: &Config) -> anyhow::Result<ServiceClient> {
    ServiceClient::builder(base_url)?
        .with_timeout(config.upstream_timeout)
        .build()
}

/// Services that receive `DELETE /api/{resource}/user/{id}` when a user goes away.
pub fn user_cascade(config: &Config) -> anyhow::Result<UserCascade> {
    let mut cascade =
        UserCascade::new().with_target("orders", peer(&config.orders_service_url, config)?);
    if config.cascade_payments {
        cascade = cascade.with_target("payments", peer(&config.payments_service_url, config)?);
    }
    if let Some(url) = &config.delivery_service_url {
        cascade = cascade.with_target("deliveries", peer(url, config)?);
    }
    Ok(cascade)
}

/// Routes for the configured service, relative to `/api`.
pub async fn build_api(config: &Config) -> anyhow::Result<Router> {
    let backend = backend(config);
    let api = match config.service {
        ServiceKind::Users => {
            let repo = Arc::new(build_repo::<User>(&backend).await?);
            let cascade = user_cascade(config)?;
            tracing::info!(
                targets = ?cascade.resources().collect::<Vec<_>>(),
                "user deletes cascade"
            );
            let hook = CascadeOnDelete::new(Arc::new(cascade));
            let service = EntityService::<User>::new(repo).with_hook(Arc::new(hook));
            resource_routes(Arc::new(service))
        }
        ServiceKind::Orders => {
            let repo = Arc::new(build_repo::<Order>(&backend).await?);
            let payments = peer(&config.payments_service_url, config)?;
            let kickoff = PaymentKickoff::new(repo.clone(), Arc::new(payments));
            let service = EntityService::<Order>::new(repo).with_hook(Arc::new(kickoff));
            resource_routes(Arc::new(service))
        }
        ServiceKind::Payments => {
            let repo = Arc::new(build_repo::<Payment>(&backend).await?);
            resource_routes(Arc::new(EntityService::<Payment>::new(repo)))
        }
        ServiceKind::Delivery => {
            let repo = Arc::new(build_repo::<Delivery>(&backend).await?);
            resource_routes(Arc::new(EntityService::<Delivery>::new(repo)))
        }
    };
    Ok(api)
}
