use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use shop_types::domain::entity::{Entity, EntityId};

use crate::application::EntityService;
use crate::errors::AppError;

type Service<E> = State<Arc<EntityService<E>>>;

/// CRUD routes for one entity kind, relative to `/api`.
///
/// User-scoped kinds additionally get `/{collection}/user/{user_id}` for
/// listing and bulk deletion.
pub fn resource_routes<E: Entity>(service: Arc<EntityService<E>>) -> Router {
    let collection = format!("/{}", E::COLLECTION);
    let item = format!("{collection}/{{id}}");

    let mut router = Router::new()
        .route(&collection, post(create::<E>).get(list::<E>))
        .route(&item, get(fetch::<E>).put(update::<E>).delete(remove::<E>))
        .route(&format!("{item}/exists"), get(exists::<E>));

    if E::USER_SCOPED {
        router = router.route(
            &format!("{collection}/user/{{user_id}}"),
            get(list_by_user::<E>).delete(delete_by_user::<E>),
        );
    }

    router.with_state(service)
}

fn parse_id(raw: &str) -> Result<EntityId, AppError> {
    match raw.parse::<EntityId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::BadRequest(format!("invalid id: {raw}"))),
    }
}

async fn create<E: Entity>(
    State(service): Service<E>,
    payload: Result<Json<E::Create>, JsonRejection>,
) -> Result<(StatusCode, Json<E>), AppError> {
    let Json(input) = payload?;
    let entity = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(entity)))
}

async fn list<E: Entity>(State(service): Service<E>) -> Result<Json<Vec<E>>, AppError> {
    Ok(Json(service.list().await?))
}

async fn fetch<E: Entity>(
    State(service): Service<E>,
    Path(id): Path<String>,
) -> Result<Json<E>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(service.get(id).await?))
}

async fn update<E: Entity>(
    State(service): Service<E>,
    Path(id): Path<String>,
    payload: Result<Json<E::Update>, JsonRejection>,
) -> Result<Json<E>, AppError> {
    let id = parse_id(&id)?;
    let Json(changes) = payload?;
    Ok(Json(service.update(id, changes).await?))
}

async fn remove<E: Entity>(
    State(service): Service<E>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn exists<E: Entity>(
    State(service): Service<E>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    let exists = service.exists(id).await;
    Ok(Json(serde_json::json!({ "exists": exists })))
}

async fn list_by_user<E: Entity>(
    State(service): Service<E>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<E>>, AppError> {
    let user_id = parse_id(&user_id)?;
    Ok(Json(service.list_by_user(user_id).await?))
}

async fn delete_by_user<E: Entity>(
    State(service): Service<E>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user_id = parse_id(&user_id)?;
    service.delete_by_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
