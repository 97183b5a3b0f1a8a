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
    auth::Session, errors::ServiceError, models::Attribute, store::Filter, validation::Rules,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/attributes",
    request_body = Attribute,
    responses(
        (status = 201, description = "Attribute created", body = Attribute),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "attributes"
)]
pub async fn create_attribute(
    session: Session,
    JsonBody(mut attribute): JsonBody<Attribute>,
) -> Result<impl IntoResponse, ServiceError> {
    attribute.check()?;

    attribute.id = Uuid::new_v4();
    attribute.user_id = session.caller().await?;
    attribute.created_at = Some(Utc::now());

    let attribute = session
        .table::<Attribute>()
        .insert(attribute)
        .await
        .map_err(store_error("Cannot save attribute to database"))?;

    info!(attribute_id = %attribute.id, "Attribute created");
    Ok(created_response(attribute))
}

#[utoipa::path(
    get,
    path = "/api/v1/attributes",
    responses(
        (status = 200, description = "All attributes", body = [Attribute]),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "attributes"
)]
pub async fn list_attributes(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let attributes = session
        .table::<Attribute>()
        .list(Vec::new())
        .await
        .map_err(store_error("Cannot fetch attributes from database"))?;

    Ok(success_response(attributes))
}

#[utoipa::path(
    get,
    path = "/api/v1/attributes/{id}",
    params(("id" = String, Path, description = "Attribute ID")),
    responses(
        (status = 200, description = "Attribute returned", body = Attribute),
        (status = 400, description = "Invalid attribute ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Attribute not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "attributes"
)]
pub async fn get_attribute(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "attribute")?;

    let attribute = session
        .table::<Attribute>()
        .first(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot fetch attribute from database"))?
        .ok_or_else(|| ServiceError::NotFound("Attribute not found".to_string()))?;

    Ok(success_response(attribute))
}

#[utoipa::path(
    put,
    path = "/api/v1/attributes/{id}",
    params(("id" = String, Path, description = "Attribute ID")),
    request_body = Attribute,
    responses(
        (status = 200, description = "Attribute updated", body = Attribute),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "attributes"
)]
pub async fn update_attribute(
    session: Session,
    PathParam(id): PathParam<String>,
    JsonBody(mut attribute): JsonBody<Attribute>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "attribute")?;
    attribute.id = id;
    attribute.check_update()?;

    attribute.user_id = session.caller().await?;
    attribute.created_at = None;

    let updated = session
        .table::<Attribute>()
        .update(attribute.clone(), vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot update attribute in database"))?;

    if updated.is_empty() {
        warn!(attribute_id = %id, "Attribute update matched no rows");
    }
    Ok(success_response(
        updated.into_iter().next().unwrap_or(attribute),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/attributes/{id}",
    params(("id" = String, Path, description = "Attribute ID")),
    responses(
        (status = 200, description = "Attribute deleted", body = super::common::MessageResponse),
        (status = 400, description = "Invalid attribute ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "attributes"
)]
pub async fn delete_attribute(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "attribute")?;

    let removed = session
        .table::<Attribute>()
        .delete(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot delete attribute from database"))?;

    if removed == 0 {
        warn!(attribute_id = %id, "Attribute delete matched no rows");
    }
    Ok(deleted_response("Attribute"))
}

pub fn attribute_routes() -> Router<AppState> {
    Router::new()
        .route("/attributes", post(create_attribute).get(list_attributes))
        .route(
            "/attributes/:id",
            get(get_attribute)
                .put(update_attribute)
                .delete(delete_attribute),
        )
}
