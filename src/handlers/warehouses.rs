//! Warehouse endpoints. Bodies carry a nested `address`; the store keeps it
//! as flat columns (see [`crate::models::warehouse`]).

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::common::{
    created_response, deleted_response, parse_id, store_error, success_response, JsonBody,
    PathParam,
};
use crate::{
    auth::Session, errors::ServiceError, models::Warehouse, store::Filter, validation::Rules,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/warehouses",
    request_body = Warehouse,
    responses(
        (status = 201, description = "Warehouse created", body = Warehouse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "warehouses"
)]
pub async fn create_warehouse(
    session: Session,
    JsonBody(mut warehouse): JsonBody<Warehouse>,
) -> Result<impl IntoResponse, ServiceError> {
    warehouse.check()?;

    let now = Utc::now();
    warehouse.id = Uuid::new_v4();
    warehouse.user_id = session.caller().await?;
    warehouse.created_at = Some(now);
    warehouse.updated_at = Some(now);

    let warehouse = session
        .table::<Warehouse>()
        .insert(warehouse)
        .await
        .map_err(store_error("Cannot save warehouse to database"))?;

    info!(warehouse_id = %warehouse.id, "Warehouse created");
    Ok(created_response(warehouse))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses",
    responses(
        (status = 200, description = "All warehouses", body = [Warehouse]),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "warehouses"
)]
pub async fn list_warehouses(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let warehouses = session
        .table::<Warehouse>()
        .list(Vec::new())
        .await
        .map_err(store_error("Cannot fetch warehouses from database"))?;

    Ok(success_response(warehouses))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses/{id}",
    params(("id" = String, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Warehouse returned", body = Warehouse),
        (status = 400, description = "Invalid warehouse ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "warehouses"
)]
pub async fn get_warehouse(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "warehouse")?;

    let warehouse = session
        .table::<Warehouse>()
        .first(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot fetch warehouse from database"))?
        .ok_or_else(|| ServiceError::NotFound("Warehouse not found".to_string()))?;

    Ok(success_response(warehouse))
}

/// Replace a warehouse; updates require a complete postal address
#[utoipa::path(
    put,
    path = "/api/v1/warehouses/{id}",
    params(("id" = String, Path, description = "Warehouse ID")),
    request_body = Warehouse,
    responses(
        (status = 200, description = "Warehouse updated", body = Warehouse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "warehouses"
)]
pub async fn update_warehouse(
    session: Session,
    PathParam(id): PathParam<String>,
    JsonBody(mut warehouse): JsonBody<Warehouse>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "warehouse")?;
    warehouse.id = id;
    warehouse.check_update()?;

    warehouse.user_id = session.caller().await?;
    warehouse.created_at = None;
    warehouse.updated_at = Some(Utc::now());

    let updated = session
        .table::<Warehouse>()
        .update(warehouse.clone(), vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot update warehouse in database"))?;

    if updated.is_empty() {
        warn!(warehouse_id = %id, "Warehouse update matched no rows");
    }
    Ok(success_response(
        updated.into_iter().next().unwrap_or(warehouse),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/warehouses/{id}",
    params(("id" = String, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Warehouse deleted", body = super::common::MessageResponse),
        (status = 400, description = "Invalid warehouse ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "warehouses"
)]
pub async fn delete_warehouse(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "warehouse")?;

    let removed = session
        .table::<Warehouse>()
        .delete(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot delete warehouse from database"))?;

    if removed == 0 {
        warn!(warehouse_id = %id, "Warehouse delete matched no rows");
    }
    Ok(deleted_response("Warehouse"))
}

pub fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/warehouses", post(create_warehouse).get(list_warehouses))
        .route(
            "/warehouses/:id",
            get(get_warehouse)
                .put(update_warehouse)
                .delete(delete_warehouse),
        )
}
