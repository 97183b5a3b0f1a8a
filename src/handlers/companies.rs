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
    auth::Session, errors::ServiceError, models::Company, store::Filter, validation::Rules,
    AppState,
};

/// Register a company owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    request_body = Company,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
pub async fn create_company(
    session: Session,
    JsonBody(mut company): JsonBody<Company>,
) -> Result<impl IntoResponse, ServiceError> {
    let now = Utc::now();
    company.id = Uuid::new_v4();
    company.owner = session.caller().await?;
    company.created_at = Some(now);
    company.updated_at = Some(now);
    company.check()?;

    let company = session
        .table::<Company>()
        .insert(company)
        .await
        .map_err(store_error("Cannot save company to database"))?;

    info!(company_id = %company.id, owner = %company.owner, "Company created");
    Ok(created_response(company))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies",
    responses(
        (status = 200, description = "Companies visible to the caller", body = [Company]),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
pub async fn list_companies(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let companies = session
        .table::<Company>()
        .list(Vec::new())
        .await
        .map_err(store_error("Cannot fetch companies from database"))?;

    Ok(success_response(companies))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    params(("id" = String, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company returned", body = Company),
        (status = 400, description = "Invalid company ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
pub async fn get_company(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "company")?;

    let company = session
        .table::<Company>()
        .first(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot fetch company from database"))?
        .ok_or_else(|| ServiceError::NotFound("Company not found".to_string()))?;

    Ok(success_response(company))
}

#[utoipa::path(
    put,
    path = "/api/v1/companies/{id}",
    params(("id" = String, Path, description = "Company ID")),
    request_body = Company,
    responses(
        (status = 200, description = "Company updated", body = Company),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
pub async fn update_company(
    session: Session,
    PathParam(id): PathParam<String>,
    JsonBody(mut company): JsonBody<Company>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "company")?;
    company.id = id;
    company.owner = session.caller().await?;
    company.created_at = None;
    company.updated_at = Some(Utc::now());
    company.check_update()?;

    let updated = session
        .table::<Company>()
        .update(company.clone(), vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot update company in database"))?;

    if updated.is_empty() {
        warn!(company_id = %id, "Company update matched no rows");
    }
    Ok(success_response(
        updated.into_iter().next().unwrap_or(company),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/companies/{id}",
    params(("id" = String, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company deleted", body = super::common::MessageResponse),
        (status = 400, description = "Invalid company ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "companies"
)]
pub async fn delete_company(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "company")?;

    let removed = session
        .table::<Company>()
        .delete(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot delete company from database"))?;

    if removed == 0 {
        warn!(company_id = %id, "Company delete matched no rows");
    }
    Ok(deleted_response("Company"))
}

pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", post(create_company).get(list_companies))
        .route(
            "/companies/:id",
            get(get_company).put(update_company).delete(delete_company),
        )
}
