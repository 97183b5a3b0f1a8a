use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::common::{
    created_response, deleted_response, parse_id, store_error, success_response, JsonBody,
    PathParam, QueryParams,
};
use crate::{
    auth::Session,
    common::{pagination, PageQuery},
    errors::ServiceError,
    models::{Product, Sku},
    store::Filter,
    validation::Rules,
    AppState,
};

/// Create a product owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = Product,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn create_product(
    session: Session,
    JsonBody(mut product): JsonBody<Product>,
) -> Result<impl IntoResponse, ServiceError> {
    product.check()?;

    let now = Utc::now();
    product.id = Uuid::new_v4();
    product.user_id = session.caller().await?;
    product.created_at = Some(now);
    product.updated_at = Some(now);

    let product = session
        .table::<Product>()
        .insert(product)
        .await
        .map_err(store_error("Cannot save product to database"))?;

    info!(product_id = %product.id, "Product created");
    Ok(created_response(product))
}

/// List one page of products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of products", body = [Product]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    session: Session,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (start, end) = pagination(query.page(), state.config.product_page_size);

    let products = session
        .table::<Product>()
        .list_range(Vec::new(), start, end)
        .await
        .map_err(store_error("Cannot fetch products from database"))?;

    Ok(success_response(products))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product returned", body = Product),
        (status = 400, description = "Invalid product ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn get_product(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "product")?;

    let product = session
        .table::<Product>()
        .first(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot fetch product from database"))?
        .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

    Ok(success_response(product))
}

/// Replace a product; the path id and the caller win over the body
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product ID")),
    request_body = Product,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn update_product(
    session: Session,
    PathParam(id): PathParam<String>,
    JsonBody(mut product): JsonBody<Product>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "product")?;
    product.id = id;
    product.check_update()?;

    product.user_id = session.caller().await?;
    product.created_at = None;
    product.updated_at = Some(Utc::now());

    let updated = session
        .table::<Product>()
        .update(product.clone(), vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot update product in database"))?;

    if updated.is_empty() {
        warn!(product_id = %id, "Product update matched no rows");
    } else {
        info!(product_id = %id, "Product updated");
    }
    Ok(success_response(updated.into_iter().next().unwrap_or(product)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = super::common::MessageResponse),
        (status = 400, description = "Invalid product ID", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn delete_product(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "product")?;

    let removed = session
        .table::<Product>()
        .delete(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot delete product from database"))?;

    if removed == 0 {
        warn!(product_id = %id, "Product delete matched no rows");
    } else {
        info!(product_id = %id, "Product deleted");
    }
    Ok(deleted_response("Product"))
}

/// SKUs belonging to a product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/skus",
    params(("id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "SKUs of the product", body = [Sku]),
        (status = 400, description = "Invalid product ID", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn list_product_skus(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let product_id = parse_id(&id, "product")?;

    let skus = session
        .table::<Sku>()
        .list(vec![Filter::eq("product_id", product_id)])
        .await
        .map_err(store_error("Cannot fetch SKUs from database"))?;

    Ok(success_response(skus))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product).get(list_products))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/:id/skus", get(list_product_skus))
}
