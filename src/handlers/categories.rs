use axum::{
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::common::{
    created_response, deleted_response, parse_id, store_error, success_response, JsonBody,
    PathParam,
};
use crate::{
    auth::Session, errors::ServiceError, models::Category, store::Filter, validation::Rules,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = Category,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    session: Session,
    JsonBody(mut category): JsonBody<Category>,
) -> Result<impl IntoResponse, ServiceError> {
    category.check()?;

    category.id = Uuid::new_v4();
    category.user_id = session.caller().await?;

    let category = session
        .table::<Category>()
        .insert(category)
        .await
        .map_err(store_error("Cannot save category to database"))?;

    info!(category_id = %category.id, parent_id = ?category.parent_id, "Category created");
    Ok(created_response(category))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "All categories", body = [Category]),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_categories(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let categories = session
        .table::<Category>()
        .list(Vec::new())
        .await
        .map_err(store_error("Cannot fetch categories from database"))?;

    Ok(success_response(categories))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category returned", body = Category),
        (status = 400, description = "Invalid category ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_category(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "category")?;

    let category = session
        .table::<Category>()
        .first(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot fetch category from database"))?
        .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))?;

    Ok(success_response(category))
}

/// Direct children of a category
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}/parent",
    params(("id" = String, Path, description = "Parent category ID")),
    responses(
        (status = 200, description = "Child categories", body = [Category]),
        (status = 400, description = "Invalid category ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_child_categories(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let parent_id = parse_id(&id, "category")?;

    let children = session
        .table::<Category>()
        .list(vec![Filter::eq("parent_id", parent_id)])
        .await
        .map_err(store_error("Cannot fetch categories from database"))?;

    Ok(success_response(children))
}

#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category ID")),
    request_body = Category,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category(
    session: Session,
    PathParam(id): PathParam<String>,
    JsonBody(mut category): JsonBody<Category>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "category")?;
    category.id = id;
    category.check_update()?;
    category.user_id = session.caller().await?;

    let updated = session
        .table::<Category>()
        .update(category.clone(), vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot update category in database"))?;

    if updated.is_empty() {
        warn!(category_id = %id, "Category update matched no rows");
    }
    Ok(success_response(
        updated.into_iter().next().unwrap_or(category),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = super::common::MessageResponse),
        (status = 400, description = "Invalid category ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "category")?;

    let removed = session
        .table::<Category>()
        .delete(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot delete category from database"))?;

    if removed == 0 {
        warn!(category_id = %id, "Category delete matched no rows");
    }
    Ok(deleted_response("Category"))
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category).get(list_categories))
        .route(
            "/categories/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/categories/:id/parent", get(list_child_categories))
}
