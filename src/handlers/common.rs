use crate::errors::ServiceError;
use async_trait::async_trait;
use axum::{
    extract::{
        rejection::PathRejection, FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;
use uuid::Uuid;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Body of a successful delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "message": "Product deleted successfully" }))]
pub struct MessageResponse {
    pub message: String,
}

pub fn deleted_response(entity: &str) -> Response {
    success_response(MessageResponse {
        message: format!("{entity} deleted successfully"),
    })
}

/// JSON request body whose rejection is the uniform `Cannot parse JSON` error
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "Rejected request body");
                Err(ServiceError::MalformedInput("Cannot parse JSON".to_string()))
            }
        }
    }
}

/// Path parameters whose rejection is a JSON error like every other failure
#[derive(Debug)]
pub struct PathParam<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParam<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(PathParam(value)),
            Err(PathRejection::FailedToDeserializePathParams(err)) => {
                debug!(reason = %err.body_text(), "Rejected path parameters");
                Err(ServiceError::InvalidIdentifier("Invalid ID".to_string()))
            }
            Err(rejection) => {
                // Route and extractor disagree; not the client's fault.
                error!(reason = %rejection.body_text(), "Path parameters unavailable");
                Err(ServiceError::InternalError(rejection.body_text()))
            }
        }
    }
}

/// Query string parameters with a JSON rejection
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => {
                debug!(reason = %rejection.body_text(), "Rejected query string");
                Err(ServiceError::MalformedInput(
                    "Cannot parse query string".to_string(),
                ))
            }
        }
    }
}

/// Parses a path identifier; `label` names it in the error, e.g. `Invalid product ID`.
pub fn parse_id(raw: &str, label: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ServiceError::InvalidIdentifier(format!("Invalid {label} ID")))
}

/// Maps a store failure to a generic message naming the operation.
pub fn store_error(context: &'static str) -> impl FnOnce(crate::store::StoreError) -> ServiceError {
    move |err| ServiceError::from_store(err, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::body::Body;

    #[test]
    fn parse_id_names_the_entity() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "product").unwrap(), id);
        assert_matches!(
            parse_id("42", "warehouse"),
            Err(ServiceError::InvalidIdentifier(message)) if message == "Invalid warehouse ID"
        );
    }

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        name: String,
    }

    #[tokio::test]
    async fn malformed_json_is_a_uniform_error() {
        let request = Request::builder()
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let result = JsonBody::<Payload>::from_request(request, &()).await;
        assert_matches!(
            result,
            Err(ServiceError::MalformedInput(message)) if message == "Cannot parse JSON"
        );
    }

    #[tokio::test]
    async fn well_formed_json_is_extracted() {
        let request = Request::builder()
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"Mug"}"#))
            .unwrap();

        assert!(JsonBody::<Payload>::from_request(request, &()).await.is_ok());
    }

    #[derive(Debug, Deserialize)]
    struct Page {
        #[allow(dead_code)]
        page: Option<String>,
    }

    #[tokio::test]
    async fn repeated_query_field_is_a_json_error() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/products?page=1&page=2")
            .body(())
            .unwrap()
            .into_parts();

        let result = QueryParams::<Page>::from_request_parts(&mut parts, &()).await;
        assert_matches!(
            result,
            Err(ServiceError::MalformedInput(message)) if message == "Cannot parse query string"
        );
    }

    #[tokio::test]
    async fn path_params_outside_a_route_are_an_internal_error() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();

        let result = PathParam::<String>::from_request_parts(&mut parts, &()).await;
        assert_matches!(result, Err(ServiceError::InternalError(_)));
    }
}
