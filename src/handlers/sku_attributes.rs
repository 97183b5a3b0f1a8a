//! Attribute values attached to a SKU. The pair `(sku_id, attribute_id)` is
//! the key, so writes are upserts.

use axum::{response::IntoResponse, routing::get, Router};
use tracing::{info, warn};

use super::common::{
    deleted_response, parse_id, store_error, success_response, JsonBody, PathParam,
};
use crate::{
    auth::Session, errors::ServiceError, models::SkuAttribute, store::Filter,
    validation::Rules, AppState,
};

/// Set the value of an attribute on a SKU, replacing any previous value
#[utoipa::path(
    post,
    path = "/api/v1/sku/{skuid}/attributes",
    params(("skuid" = String, Path, description = "SKU ID")),
    request_body = SkuAttribute,
    responses(
        (status = 200, description = "Attribute value stored", body = SkuAttribute),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "sku-attributes"
)]
pub async fn upsert_sku_attribute(
    session: Session,
    PathParam(sku_id): PathParam<String>,
    JsonBody(mut link): JsonBody<SkuAttribute>,
) -> Result<impl IntoResponse, ServiceError> {
    link.sku_id = parse_id(&sku_id, "SKU")?;
    link.check()?;
    link.user_id = session.caller().await?;

    let link = session
        .table::<SkuAttribute>()
        .upsert(link)
        .await
        .map_err(store_error("Cannot save SKU attribute to database"))?;

    info!(sku_id = %link.sku_id, attribute_id = %link.attribute_id, "SKU attribute stored");
    Ok(success_response(link))
}

#[utoipa::path(
    get,
    path = "/api/v1/sku/{skuid}/attributes",
    params(("skuid" = String, Path, description = "SKU ID")),
    responses(
        (status = 200, description = "Attribute values of the SKU", body = [SkuAttribute]),
        (status = 400, description = "Invalid SKU ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "sku-attributes"
)]
pub async fn list_sku_attributes(
    session: Session,
    PathParam(sku_id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let sku_id = parse_id(&sku_id, "SKU")?;

    let links = session
        .table::<SkuAttribute>()
        .list(vec![Filter::eq("sku_id", sku_id)])
        .await
        .map_err(store_error("Cannot fetch SKU attributes from database"))?;

    Ok(success_response(links))
}

#[utoipa::path(
    get,
    path = "/api/v1/sku/{skuid}/attributes/{id}",
    params(
        ("skuid" = String, Path, description = "SKU ID"),
        ("id" = String, Path, description = "Attribute ID")
    ),
    responses(
        (status = 200, description = "Attribute value returned", body = SkuAttribute),
        (status = 400, description = "Invalid identifier", body = crate::errors::ErrorResponse),
        (status = 404, description = "SKU attribute not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "sku-attributes"
)]
pub async fn get_sku_attribute(
    session: Session,
    PathParam((sku_id, attribute_id)): PathParam<(String, String)>,
) -> Result<impl IntoResponse, ServiceError> {
    let sku_id = parse_id(&sku_id, "SKU")?;
    let attribute_id = parse_id(&attribute_id, "attribute")?;

    let link = session
        .table::<SkuAttribute>()
        .first(vec![
            Filter::eq("sku_id", sku_id),
            Filter::eq("attribute_id", attribute_id),
        ])
        .await
        .map_err(store_error("Cannot fetch SKU attribute from database"))?
        .ok_or_else(|| ServiceError::NotFound("SKU attribute not found".to_string()))?;

    Ok(success_response(link))
}

#[utoipa::path(
    delete,
    path = "/api/v1/sku/{skuid}/attributes/{id}",
    params(
        ("skuid" = String, Path, description = "SKU ID"),
        ("id" = String, Path, description = "Attribute ID")
    ),
    responses(
        (status = 200, description = "SKU attribute deleted", body = super::common::MessageResponse),
        (status = 400, description = "Invalid identifier", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "sku-attributes"
)]
pub async fn delete_sku_attribute(
    session: Session,
    PathParam((sku_id, attribute_id)): PathParam<(String, String)>,
) -> Result<impl IntoResponse, ServiceError> {
    let sku_id = parse_id(&sku_id, "SKU")?;
    let attribute_id = parse_id(&attribute_id, "attribute")?;

    let removed = session
        .table::<SkuAttribute>()
        .delete(vec![
            Filter::eq("sku_id", sku_id),
            Filter::eq("attribute_id", attribute_id),
        ])
        .await
        .map_err(store_error("Cannot delete SKU attribute from database"))?;

    if removed == 0 {
        warn!(%sku_id, %attribute_id, "SKU attribute delete matched no rows");
    }
    Ok(deleted_response("SKU attribute"))
}

pub fn sku_attribute_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sku/:skuid/attributes",
            get(list_sku_attributes).post(upsert_sku_attribute),
        )
        .route(
            "/sku/:skuid/attributes/:id",
            get(get_sku_attribute).delete(delete_sku_attribute),
        )
}
