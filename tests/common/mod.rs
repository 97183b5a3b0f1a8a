#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use inventory_manager_api::{app_router, config::AppConfig, store::MemoryStore, AppState};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TOKEN: &str = "test-token";
pub const OTHER_TOKEN: &str = "other-test-token";

/// Application router backed by an in-memory store with two known callers.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
    pub user_id: Uuid,
    pub other_user_id: Uuid,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::in_memory())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let user_id = Uuid::new_v4();
        let other_user_id = Uuid::new_v4();
        store.register_token(TOKEN, user_id);
        store.register_token(OTHER_TOKEN, other_user_id);

        let state = AppState::new(config, Arc::new(store.clone()));
        Self {
            router: app_router(state),
            store,
            user_id,
            other_user_id,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let body = body.map(|json| serde_json::to_string(&json).expect("serialize request body"));
        self.send(method, uri, body, token).await
    }

    /// Sends `body` verbatim, for payloads that are not valid JSON.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<String>,
        token: Option<&str>,
    ) -> Response {
        self.send_with_headers(method, uri, body, token, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> Response {
        self.send_with_headers(method, uri, None, None, headers).await
    }

    async fn send_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<String>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let body = match body {
            Some(raw) => {
                builder = builder.header("content-type", "application/json");
                Body::from(raw)
            }
            None => Body::empty(),
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(TOKEN)).await
    }

    pub async fn request_as_other(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(OTHER_TOKEN)).await
    }

    /// Creates an entity and returns the stored body, asserting a 201.
    pub async fn create(&self, uri: &str, body: Value) -> Value {
        let response = self.request_authenticated(Method::POST, uri, Some(body)).await;
        assert_eq!(response.status(), 201, "create at {uri} failed");
        response_json(response).await
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 response")
}
