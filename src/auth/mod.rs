/*!
 * # Authentication Module
 *
 * Authentication is delegated to the hosted backend. This module only
 *
 * - rejects requests that carry no bearer credential (`require_bearer`)
 * - binds a store handle to the credential for the duration of a request
 *   (`Session`), through which handlers resolve the caller's identity
 */

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::store::{Record, Store, Table};
use crate::AppState;

/// Raw access token taken from the `Authorization` header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Reads the token from a header value, with or without the `Bearer`
    /// scheme (matched case-insensitively). Blank values and a bare scheme
    /// yield `None`.
    pub fn from_header_value(value: &str) -> Option<Self> {
        let value = value.trim();
        let token = match value.split_once(char::is_whitespace) {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
            None if value.eq_ignore_ascii_case("bearer") => "",
            _ => value,
        };
        if token.is_empty() {
            None
        } else {
            Some(Self(token.to_string()))
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(Self::from_header_value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rejects requests without a bearer credential before any handler runs.
pub async fn require_bearer(mut request: Request, next: Next) -> Response {
    match BearerToken::from_headers(request.headers()) {
        Some(token) => {
            request.extensions_mut().insert(token);
            next.run(request).await
        }
        None => {
            debug!(uri = %request.uri(), "Rejected request without bearer credential");
            ServiceError::Unauthorized("Unauthorized".to_string()).into_response()
        }
    }
}

/// Store handle acting as the authenticated caller for one request
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn Store>,
}

impl Session {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn table<T: Record>(&self) -> Table<'_, T> {
        Table::new(self.store.as_ref())
    }

    /// Resolves the caller's user id through the backend's auth endpoint.
    pub async fn caller(&self) -> Result<Uuid, ServiceError> {
        self.store.current_user().await.map_err(|err| {
            warn!(error = %err, "Could not resolve caller identity");
            ServiceError::Unauthorized("Cannot fetch user ID - please log in".to_string())
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .or_else(|| BearerToken::from_headers(&parts.headers))
            .ok_or_else(|| ServiceError::Unauthorized("Unauthorized".to_string()))?;

        Ok(Session::new(state.connector.connect(token.as_str())))
    }
}
