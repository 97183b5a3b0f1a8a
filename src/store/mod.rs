//! Persistence capability consumed by the HTTP handlers.
//!
//! The hosted backend owns the data, authentication and row-level access
//! policy. This module only describes the operations the handlers need
//! (select/insert/upsert/update/delete on a named collection with equality
//! filters and an optional index range) and provides two implementations:
//!
//! - [`PostgrestConnector`], which talks to a PostgREST-compatible REST API
//! - [`MemoryStore`], an in-process stand-in used by tests and local runs

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgrest;
pub mod query;
pub mod table;

pub use memory::MemoryStore;
pub use postgrest::PostgrestConnector;
pub use query::{Filter, Query};
pub use table::{CompositeKey, Record, Table};

/// Errors raised by a store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store rejected credentials: {0}")]
    Unauthorized(String),

    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("codec error: {0}")]
    Codec(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Codec(err.to_string())
    }
}

/// A store handle bound to a single caller's credential.
///
/// Rows travel as JSON objects. Mutating calls return the rows the store
/// reports as affected, which lets callers tell an applied change from one
/// the access policy silently dropped.
#[async_trait]
pub trait Store: Send + Sync {
    /// Resolves the credential to the caller's user id.
    async fn current_user(&self) -> Result<Uuid, StoreError>;

    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError>;

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, StoreError>;

    /// Insert-or-update keyed on the `on_conflict` columns.
    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &[&str],
    ) -> Result<Vec<Value>, StoreError>;

    async fn update(
        &self,
        table: &str,
        row: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError>;

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError>;
}

/// Builds a fresh [`Store`] handle for each request from the caller's bearer token.
pub trait StoreConnector: Send + Sync {
    fn connect(&self, access_token: &str) -> Arc<dyn Store>;
}
