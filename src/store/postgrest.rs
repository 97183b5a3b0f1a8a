//! Client for a PostgREST-compatible hosted backend.
//!
//! Every request carries the project `apikey` header and the caller's bearer
//! token, so the backend evaluates its row-level policy as the caller.

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Filter, Query, Store, StoreConnector, StoreError};

const REPRESENTATION: &str = "return=representation";

/// Shared connection settings; cheap to clone.
#[derive(Clone, Debug)]
pub struct PostgrestConnector {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestConnector {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, StoreError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

impl StoreConnector for PostgrestConnector {
    fn connect(&self, access_token: &str) -> Arc<dyn Store> {
        Arc::new(PostgrestStore {
            connector: self.clone(),
            access_token: access_token.to_string(),
        })
    }
}

/// A PostgREST handle acting as one caller
pub struct PostgrestStore {
    connector: PostgrestConnector,
    access_token: String,
}

#[derive(Deserialize)]
struct AuthenticatedUser {
    id: Uuid,
}

impl PostgrestStore {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.connector.base_url, path);
        self.connector
            .client
            .request(method, url)
            .header("apikey", &self.connector.api_key)
            .bearer_auth(&self.access_token)
    }

    fn table(&self, method: Method, table: &str, filters: &[Filter]) -> RequestBuilder {
        let params: Vec<(&str, String)> = filters
            .iter()
            .map(|filter| (filter.column(), format!("eq.{}", filter.value())))
            .collect();
        self.request(method, &format!("rest/v1/{table}"))
            .query(&params)
    }
}

async fn rejection(status: StatusCode, response: Response) -> StoreError {
    let message = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        StoreError::Unauthorized(message)
    } else {
        StoreError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

/// Reads a row set out of a response. An empty body counts as no rows.
async fn rows(response: Response) -> Result<Vec<Value>, StoreError> {
    let status = response.status();
    if status == StatusCode::RANGE_NOT_SATISFIABLE {
        return Ok(Vec::new());
    }
    if !status.is_success() {
        return Err(rejection(status, response).await);
    }

    let body = response.bytes().await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match serde_json::from_slice::<Value>(&body)? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        row => Ok(vec![row]),
    }
}

#[async_trait]
impl Store for PostgrestStore {
    async fn current_user(&self) -> Result<Uuid, StoreError> {
        let response = self.request(Method::GET, "auth/v1/user").send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status, response).await);
        }
        let user: AuthenticatedUser = response.json().await?;
        Ok(user.id)
    }

    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut request = self
            .table(Method::GET, query.table(), query.filter_list())
            .query(&[("select", "*")]);
        if let Some((start, end)) = query.index_range() {
            request = request
                .header("Range-Unit", "items")
                .header(header::RANGE, format!("{start}-{end}"));
        }

        debug!(table = query.table(), "postgrest select");
        rows(request.send().await?).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, StoreError> {
        let response = self
            .table(Method::POST, table, &[])
            .header("Prefer", REPRESENTATION)
            .json(&row)
            .send()
            .await?;
        rows(response).await
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &[&str],
    ) -> Result<Vec<Value>, StoreError> {
        let response = self
            .table(Method::POST, table, &[])
            .query(&[("on_conflict", on_conflict.join(","))])
            .header(
                "Prefer",
                format!("{REPRESENTATION},resolution=merge-duplicates"),
            )
            .json(&row)
            .send()
            .await?;
        rows(response).await
    }

    async fn update(
        &self,
        table: &str,
        row: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError> {
        if filters.is_empty() {
            warn!(table, "refusing unfiltered update");
            return Err(StoreError::Rejected {
                status: 400,
                message: "update requires at least one filter".to_string(),
            });
        }
        let response = self
            .table(Method::PATCH, table, filters)
            .header("Prefer", REPRESENTATION)
            .json(&row)
            .send()
            .await?;
        rows(response).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError> {
        if filters.is_empty() {
            warn!(table, "refusing unfiltered delete");
            return Err(StoreError::Rejected {
                status: 400,
                message: "delete requires at least one filter".to_string(),
            });
        }
        let response = self
            .table(Method::DELETE, table, filters)
            .header("Prefer", REPRESENTATION)
            .send()
            .await?;
        rows(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn store_for(server: &MockServer) -> Arc<dyn Store> {
        PostgrestConnector::new(&server.uri(), "anon-key", None)
            .unwrap()
            .connect("user-token")
    }

    #[tokio::test]
    async fn select_sends_credentials_filters_and_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/inventory"))
            .and(query_param("location_id", "eq.loc-1"))
            .and(query_param("select", "*"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer user-token"))
            .and(header("range", "0-9"))
            .and(header("range-unit", "items"))
            .respond_with(
                ResponseTemplate::new(206).set_body_json(json!([{ "quantity": 5 }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let rows = store_for(&server)
            .select(&Query::from("inventory").eq("location_id", "loc-1").range(0, 9))
            .await
            .unwrap();

        assert_eq!(rows, vec![json!({ "quantity": 5 })]);
    }

    #[tokio::test]
    async fn unsatisfiable_range_is_an_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .respond_with(ResponseTemplate::new(416))
            .mount(&server)
            .await;

        let rows = store_for(&server)
            .select(&Query::from("products").range(100, 109))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn upsert_names_conflict_columns() {
        let server = MockServer::start().await;
        let row = json!({ "sku_id": "s", "location_id": "l", "quantity": 2 });
        Mock::given(method("POST"))
            .and(path("/rest/v1/inventory"))
            .and(query_param("on_conflict", "sku_id,location_id"))
            .and(|request: &Request| {
                request.headers.get("prefer").and_then(|v| v.to_str().ok())
                    == Some("return=representation,resolution=merge-duplicates")
            })
            .and(body_json(row.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([row.clone()])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = store_for(&server)
            .upsert("inventory", row.clone(), &["sku_id", "location_id"])
            .await
            .unwrap();
        assert_eq!(rows, vec![row]);
    }

    #[tokio::test]
    async fn update_counts_returned_rows() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/products"))
            .and(query_param("id", "eq.42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let rows = store_for(&server)
            .update("products", json!({ "name": "x" }), &[Filter::eq("id", 42)])
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn unfiltered_delete_never_reaches_the_backend() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = store_for(&server).delete("products", &[]).await;
        assert_matches!(result, Err(StoreError::Rejected { status: 400, .. }));
    }

    #[tokio::test]
    async fn current_user_reads_auth_endpoint() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "id": id, "email": "a@example.com" })),
            )
            .mount(&server)
            .await;

        assert_eq!(store_for(&server).current_user().await.unwrap(), id);
    }

    #[tokio::test]
    async fn rejected_token_maps_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid JWT"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/products"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key"))
            .mount(&server)
            .await;

        let store = store_for(&server);
        assert_matches!(
            store.current_user().await,
            Err(StoreError::Unauthorized(message)) if message == "invalid JWT"
        );
        assert_matches!(
            store.insert("products", json!({})).await,
            Err(StoreError::Rejected { status: 409, .. })
        );
    }
}
