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
    auth::Session, errors::ServiceError, models::Barcode, store::Filter, validation::Rules,
    AppState,
};

/// Register a barcode for a SKU; unnamed barcodes get a default name
#[utoipa::path(
    post,
    path = "/api/v1/barcodes",
    request_body = Barcode,
    responses(
        (status = 201, description = "Barcode created", body = Barcode),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "barcodes"
)]
pub async fn create_barcode(
    session: Session,
    JsonBody(barcode): JsonBody<Barcode>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut barcode = barcode.with_default_name();
    barcode.check()?;

    let now = Utc::now();
    barcode.id = Uuid::new_v4();
    barcode.user_id = session.caller().await?;
    barcode.created_at = Some(now);
    barcode.updated_at = Some(now);

    let barcode = session
        .table::<Barcode>()
        .insert(barcode)
        .await
        .map_err(store_error("Cannot save barcode to database"))?;

    info!(barcode_id = %barcode.id, sku_id = %barcode.sku_id, "Barcode created");
    Ok(created_response(barcode))
}

#[utoipa::path(
    get,
    path = "/api/v1/barcodes",
    responses(
        (status = 200, description = "All barcodes", body = [Barcode]),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "barcodes"
)]
pub async fn list_barcodes(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let barcodes = session
        .table::<Barcode>()
        .list(Vec::new())
        .await
        .map_err(store_error("Cannot fetch barcodes from database"))?;

    Ok(success_response(barcodes))
}

#[utoipa::path(
    get,
    path = "/api/v1/barcodes/{id}",
    params(("id" = String, Path, description = "Barcode ID")),
    responses(
        (status = 200, description = "Barcode returned", body = Barcode),
        (status = 400, description = "Invalid barcode ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Barcode not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "barcodes"
)]
pub async fn get_barcode(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "barcode")?;

    let barcode = session
        .table::<Barcode>()
        .first(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot fetch barcode from database"))?
        .ok_or_else(|| ServiceError::NotFound("Barcode not found".to_string()))?;

    Ok(success_response(barcode))
}

#[utoipa::path(
    put,
    path = "/api/v1/barcodes/{id}",
    params(("id" = String, Path, description = "Barcode ID")),
    request_body = Barcode,
    responses(
        (status = 200, description = "Barcode updated", body = Barcode),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "barcodes"
)]
pub async fn update_barcode(
    session: Session,
    PathParam(id): PathParam<String>,
    JsonBody(barcode): JsonBody<Barcode>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "barcode")?;
    let mut barcode = barcode.with_default_name();
    barcode.id = id;
    barcode.check_update()?;

    barcode.user_id = session.caller().await?;
    barcode.created_at = None;
    barcode.updated_at = Some(Utc::now());

    let updated = session
        .table::<Barcode>()
        .update(barcode.clone(), vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot update barcode in database"))?;

    if updated.is_empty() {
        warn!(barcode_id = %id, "Barcode update matched no rows");
    }
    Ok(success_response(updated.into_iter().next().unwrap_or(barcode)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/barcodes/{id}",
    params(("id" = String, Path, description = "Barcode ID")),
    responses(
        (status = 200, description = "Barcode deleted", body = super::common::MessageResponse),
        (status = 400, description = "Invalid barcode ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "barcodes"
)]
pub async fn delete_barcode(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "barcode")?;

    let removed = session
        .table::<Barcode>()
        .delete(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot delete barcode from database"))?;

    if removed == 0 {
        warn!(barcode_id = %id, "Barcode delete matched no rows");
    }
    Ok(deleted_response("Barcode"))
}

pub fn barcode_routes() -> Router<AppState> {
    Router::new()
        .route("/barcodes", post(create_barcode).get(list_barcodes))
        .route(
            "/barcodes/:id",
            get(get_barcode).put(update_barcode).delete(delete_barcode),
        )
}
