//! Profiles of authenticated identities. A profile's id is the caller's auth
//! id, so the `/users/me` routes never take an id from the client.

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use tracing::{info, warn};

use super::common::{
    created_response, deleted_response, parse_id, store_error, success_response, JsonBody,
    PathParam,
};
use crate::{
    auth::Session, errors::ServiceError, models::User, store::Filter, validation::Rules,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = User,
    responses(
        (status = 201, description = "Profile created", body = User),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    session: Session,
    JsonBody(mut user): JsonBody<User>,
) -> Result<impl IntoResponse, ServiceError> {
    user.check()?;

    user.id = session.caller().await?;
    user.updated_at = Some(Utc::now());

    let user = session
        .table::<User>()
        .insert(user)
        .await
        .map_err(store_error("Cannot save user to database"))?;

    info!(user_id = %user.id, company_id = %user.company_id, "User profile created");
    Ok(created_response(user))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Caller's profile", body = User),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_current_user(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let id = session.caller().await?;
    find_user(&session, id).await.map(success_response)
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile returned", body = User),
        (status = 400, description = "Invalid user ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    session: Session,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id, "user")?;
    find_user(&session, id).await.map(success_response)
}

async fn find_user(session: &Session, id: uuid::Uuid) -> Result<User, ServiceError> {
    session
        .table::<User>()
        .first(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot fetch user from database"))?
        .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = User,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_current_user(
    session: Session,
    JsonBody(mut user): JsonBody<User>,
) -> Result<impl IntoResponse, ServiceError> {
    user.check_update()?;

    let id = session.caller().await?;
    user.id = id;
    user.updated_at = Some(Utc::now());

    let updated = session
        .table::<User>()
        .update(user.clone(), vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot update user in database"))?;

    if updated.is_empty() {
        warn!(user_id = %id, "User update matched no rows");
    }
    Ok(success_response(updated.into_iter().next().unwrap_or(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile deleted", body = super::common::MessageResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_current_user(session: Session) -> Result<impl IntoResponse, ServiceError> {
    let id = session.caller().await?;

    let removed = session
        .table::<User>()
        .delete(vec![Filter::eq("id", id)])
        .await
        .map_err(store_error("Cannot delete user from database"))?;

    if removed == 0 {
        warn!(user_id = %id, "User delete matched no rows");
    }
    Ok(deleted_response("User"))
}

#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}/users",
    params(("id" = String, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Users of the company", body = [User]),
        (status = 400, description = "Invalid company ID", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_company_users(
    session: Session,
    PathParam(company_id): PathParam<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let company_id = parse_id(&company_id, "company")?;

    let users = session
        .table::<User>()
        .list(vec![Filter::eq("company_id", company_id)])
        .await
        .map_err(store_error("Cannot fetch users from database"))?;

    Ok(success_response(users))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route(
            "/users/me",
            get(get_current_user)
                .put(update_current_user)
                .delete(delete_current_user),
        )
        .route("/users/:id", get(get_user))
        .route("/companies/:id/users", get(list_company_users))
}
