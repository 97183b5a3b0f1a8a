//! Stock levels per warehouse. Rows are keyed by `(sku_id, location_id)`, so
//! there is no create/update split: writing a quantity is an upsert.

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use tracing::{info, warn};

use super::common::{
    deleted_response, parse_id, store_error, success_response, JsonBody, PathParam,
};
use crate::{
    auth::Session, errors::ServiceError, models::Inventory, store::Filter, validation::Rules,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    responses(
        (status = 200, description = "All inventory rows", body = [Inventory]),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn list_inventory(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let rows = session
        .table::<Inventory>()
        .list(Vec::new())
        .await
        .map_err(store_error("Cannot fetch inventory from database"))?;

    Ok(success_response(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/{locationid}",
    params(("locationid" = String, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Inventory held at the warehouse", body = [Inventory]),
        (status = 400, description = "Invalid location ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn list_location_inventory(
    session: Session,
    PathParam(location_id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let location_id = parse_id(&location_id, "location")?;

    let rows = session
        .table::<Inventory>()
        .list(vec![Filter::eq("location_id", location_id)])
        .await
        .map_err(store_error("Cannot fetch inventory from database"))?;

    Ok(success_response(rows))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/{locationid}/sku/{skuid}",
    params(
        ("locationid" = String, Path, description = "Warehouse ID"),
        ("skuid" = String, Path, description = "SKU ID")
    ),
    responses(
        (status = 200, description = "Inventory row returned", body = Inventory),
        (status = 400, description = "Invalid identifier", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn get_inventory(
    session: Session,
    PathParam((location_id, sku_id)): PathParam<(String, String)>,
) -> Result<impl IntoResponse, ServiceError> {
    let location_id = parse_id(&location_id, "location")?;
    let sku_id = parse_id(&sku_id, "SKU")?;

    let row = session
        .table::<Inventory>()
        .first(vec![
            Filter::eq("location_id", location_id),
            Filter::eq("sku_id", sku_id),
        ])
        .await
        .map_err(store_error("Cannot fetch inventory from database"))?
        .ok_or_else(|| ServiceError::NotFound("Inventory not found".to_string()))?;

    Ok(success_response(row))
}

/// Set the quantity of a SKU at a warehouse, creating the row if needed
#[utoipa::path(
    post,
    path = "/api/v1/inventory/{locationid}/{skuid}",
    params(
        ("locationid" = String, Path, description = "Warehouse ID"),
        ("skuid" = String, Path, description = "SKU ID")
    ),
    request_body = Inventory,
    responses(
        (status = 200, description = "Quantity stored", body = Inventory),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn upsert_inventory(
    session: Session,
    PathParam((location_id, sku_id)): PathParam<(String, String)>,
    JsonBody(mut row): JsonBody<Inventory>,
) -> Result<impl IntoResponse, ServiceError> {
    row.location_id = parse_id(&location_id, "location")?;
    row.sku_id = parse_id(&sku_id, "SKU")?;
    row.check()?;

    row.user_id = session.caller().await?;
    row.updated_at = Some(Utc::now());

    let row = session
        .table::<Inventory>()
        .upsert(row)
        .await
        .map_err(store_error("Cannot save inventory to database"))?;

    info!(
        location_id = %row.location_id,
        sku_id = %row.sku_id,
        quantity = row.quantity,
        "Inventory quantity stored"
    );
    Ok(success_response(row))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{locationid}",
    params(("locationid" = String, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Inventory at the warehouse deleted", body = super::common::MessageResponse),
        (status = 400, description = "Invalid location ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn delete_location_inventory(
    session: Session,
    PathParam(location_id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let location_id = parse_id(&location_id, "location")?;

    let removed = session
        .table::<Inventory>()
        .delete(vec![Filter::eq("location_id", location_id)])
        .await
        .map_err(store_error("Cannot delete inventory from database"))?;

    info!(%location_id, removed, "Inventory cleared for location");
    Ok(deleted_response("Inventory"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{locationid}/sku/{skuid}",
    params(
        ("locationid" = String, Path, description = "Warehouse ID"),
        ("skuid" = String, Path, description = "SKU ID")
    ),
    responses(
        (status = 200, description = "Inventory row deleted", body = super::common::MessageResponse),
        (status = 400, description = "Invalid identifier", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn delete_inventory(
    session: Session,
    PathParam((location_id, sku_id)): PathParam<(String, String)>,
) -> Result<impl IntoResponse, ServiceError> {
    let location_id = parse_id(&location_id, "location")?;
    let sku_id = parse_id(&sku_id, "SKU")?;

    let removed = session
        .table::<Inventory>()
        .delete(vec![
            Filter::eq("location_id", location_id),
            Filter::eq("sku_id", sku_id),
        ])
        .await
        .map_err(store_error("Cannot delete inventory from database"))?;

    if removed == 0 {
        warn!(%location_id, %sku_id, "Inventory delete matched no rows");
    }
    Ok(deleted_response("Inventory"))
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_inventory))
        .route(
            "/inventory/:locationid",
            get(list_location_inventory).delete(delete_location_inventory),
        )
        .route(
            "/inventory/:locationid/sku/:skuid",
            get(get_inventory).delete(delete_inventory),
        )
        .route("/inventory/:locationid/:skuid", post(upsert_inventory))
}
