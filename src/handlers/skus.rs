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
use super::products::list_product_skus;
use crate::{
    auth::Session,
    errors::ServiceError,
    models::{Barcode, Inventory, Sku},
    store::Filter,
    validation::Rules,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/skus",
    request_body = Sku,
    responses(
        (status = 201, description = "SKU created", body = Sku),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "skus"
)]
pub async fn create_sku(
    session: Session,
    JsonBody(mut sku): JsonBody<Sku>,
) -> Result<impl IntoResponse, ServiceError> {
    sku.check()?;

    let now = Utc::now();
    sku.id = Uuid::new_v4();
    sku.user_id = session.caller().await?;
    sku.created_at = Some(now);
    sku.updated_at = Some(now);

    let sku = session
        .table::<Sku>()
        .insert(sku)
        .await
        .map_err(store_error("Cannot save SKU to database"))?;

    info!(sku_id = %sku.id, product_id = %sku.product_id, "SKU created");
    Ok(created_response(sku))
}

#[utoipa::path(
    get,
    path = "/api/v1/skus",
    responses(
        (status = 200, description = "All SKUs visible to the caller", body = [Sku]),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "skus"
)]
pub async fn list_skus(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let skus = session
        .table::<Sku>()
        .list(Vec::new())
        .await
        .map_err(store_error("Cannot fetch SKUs from database"))?;

    Ok(success_response(skus))
}

#[utoipa::path(
    get,
    path = "/api/v1/skus/{id}",
    params(("id" = String, Path, description = "SKU ID")),
    responses(
        (status = 200, description = "SKU returned", body = Sku),
        (status = 400, description = "Invalid SKU ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "SKU not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "skus"
)]
pub async fn get_sku(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "SKU")?;

    let sku = session
        .table::<Sku>()
        .first(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot fetch SKU from database"))?
        .ok_or_else(|| ServiceError::NotFound("SKU not found".to_string()))?;

    Ok(success_response(sku))
}

#[utoipa::path(
    put,
    path = "/api/v1/skus/{id}",
    params(("id" = String, Path, description = "SKU ID")),
    request_body = Sku,
    responses(
        (status = 200, description = "SKU updated", body = Sku),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "skus"
)]
pub async fn update_sku(
    session: Session,
    PathParam(id): PathParam<String>,
    JsonBody(mut sku): JsonBody<Sku>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "SKU")?;
    sku.id = id;
    sku.check_update()?;

    sku.user_id = session.caller().await?;
    sku.created_at = None;
    sku.updated_at = Some(Utc::now());

    let updated = session
        .table::<Sku>()
        .update(sku.clone(), vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot update SKU in database"))?;

    if updated.is_empty() {
        warn!(sku_id = %id, "SKU update matched no rows");
    }
    Ok(success_response(updated.into_iter().next().unwrap_or(sku)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/skus/{id}",
    params(("id" = String, Path, description = "SKU ID")),
    responses(
        (status = 200, description = "SKU deleted", body = super::common::MessageResponse),
        (status = 400, description = "Invalid SKU ID", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "skus"
)]
pub async fn delete_sku(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "SKU")?;

    let removed = session
        .table::<Sku>()
        .delete(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot delete SKU from database"))?;

    if removed == 0 {
        warn!(sku_id = %id, "SKU delete matched no rows");
    }
    Ok(deleted_response("SKU"))
}

#[utoipa::path(
    get,
    path = "/api/v1/skus/{id}/barcodes",
    params(("id" = String, Path, description = "SKU ID")),
    responses(
        (status = 200, description = "Barcodes of the SKU", body = [Barcode]),
        (status = 400, description = "Invalid SKU ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "skus"
)]
pub async fn list_sku_barcodes(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let sku_id = parse_id(&id, "SKU")?;

    let barcodes = session
        .table::<Barcode>()
        .list(vec![Filter::eq("sku_id", sku_id)])
        .await
        .map_err(store_error("Cannot fetch barcodes from database"))?;

    Ok(success_response(barcodes))
}

/// Stock of one SKU across every location
#[utoipa::path(
    get,
    path = "/api/v1/skus/{id}/inventory",
    params(("id" = String, Path, description = "SKU ID")),
    responses(
        (status = 200, description = "Inventory rows of the SKU", body = [Inventory]),
        (status = 400, description = "Invalid SKU ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "skus"
)]
pub async fn list_sku_inventory(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let sku_id = parse_id(&id, "SKU")?;

    let rows = session
        .table::<Inventory>()
        .list(vec![Filter::eq("sku_id", sku_id)])
        .await
        .map_err(store_error("Cannot fetch inventory from database"))?;

    Ok(success_response(rows))
}

pub fn sku_routes() -> Router<AppState> {
    Router::new()
        .route("/skus", post(create_sku).get(list_skus))
        .route("/skus/:id", get(get_sku).put(update_sku).delete(delete_sku))
        // the id here is a product id
        .route("/skus/:id/products", get(list_product_skus))
        .route("/skus/:id/barcodes", get(list_sku_barcodes))
        .route("/skus/:id/inventory", get(list_sku_inventory))
}
