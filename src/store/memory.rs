//! In-process store with the same visibility rules as the hosted backend.
//!
//! Rows carrying a `user_id` or `owner` column are only visible to, and only
//! mutable by, the caller whose id they hold. Writes the policy filters out
//! succeed with zero affected rows, matching a hosted row-level policy.
//! The `id` column is a primary key: inserting a taken id is a conflict.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{Filter, Query, Store, StoreConnector, StoreError};

const OWNER_COLUMNS: [&str; 2] = ["user_id", "owner"];

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<String, Vec<Value>>,
    tokens: DashMap<String, Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `token` a valid credential for `user_id`.
    pub fn register_token(&self, token: impl Into<String>, user_id: Uuid) {
        self.tokens.insert(token.into(), user_id);
    }

    /// Snapshot of a collection regardless of ownership.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .get(table)
            .map(|rows| rows.value().clone())
            .unwrap_or_default()
    }

    fn caller(&self, token: &str) -> Result<Uuid, StoreError> {
        self.tokens
            .get(token)
            .map(|entry| *entry.value())
            .ok_or_else(|| StoreError::Unauthorized("invalid access token".to_string()))
    }
}

impl StoreConnector for Arc<MemoryStore> {
    fn connect(&self, access_token: &str) -> Arc<dyn Store> {
        Arc::new(MemorySession {
            store: Arc::clone(self),
            token: access_token.to_string(),
        })
    }
}

/// A [`MemoryStore`] handle bound to one credential
pub struct MemorySession {
    store: Arc<MemoryStore>,
    token: String,
}

fn owned_by(row: &Value, caller: Uuid) -> bool {
    let caller = caller.to_string();
    OWNER_COLUMNS.iter().all(|column| match row.get(*column) {
        Some(Value::String(owner)) => *owner == caller,
        _ => true,
    })
}

fn matches_all(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| filter.matches(row))
}

fn as_object(row: Value) -> Result<Map<String, Value>, StoreError> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Codec(format!("expected a JSON object, got {other}"))),
    }
}

fn merge(target: &mut Value, changes: &Map<String, Value>) {
    if let Value::Object(existing) = target {
        for (key, value) in changes {
            existing.insert(key.clone(), value.clone());
        }
    }
}

fn id_of(row: &Value) -> Option<&Value> {
    row.get("id").filter(|id| !id.is_null())
}

fn duplicate_key(table: &str) -> StoreError {
    StoreError::Rejected {
        status: 409,
        message: format!("duplicate key value violates unique constraint \"{table}_pkey\""),
    }
}

fn policy_violation() -> StoreError {
    StoreError::Rejected {
        status: 403,
        message: "new row violates row-level security policy".to_string(),
    }
}

#[async_trait]
impl Store for MemorySession {
    async fn current_user(&self) -> Result<Uuid, StoreError> {
        self.store.caller(&self.token)
    }

    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let caller = self.store.caller(&self.token)?;
        let visible = self
            .store
            .rows(query.table())
            .into_iter()
            .filter(|row| owned_by(row, caller) && matches_all(row, query.filter_list()));

        let rows: Vec<Value> = match query.index_range() {
            Some((start, end)) if end >= start => visible
                .skip(start as usize)
                .take((end - start + 1) as usize)
                .collect(),
            Some(_) => Vec::new(),
            None => visible.collect(),
        };
        debug!(table = query.table(), rows = rows.len(), "memory select");
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, StoreError> {
        let caller = self.store.caller(&self.token)?;
        let row = Value::Object(as_object(row)?);
        if !owned_by(&row, caller) {
            return Err(policy_violation());
        }
        let mut rows = self.store.tables.entry(table.to_string()).or_default();
        if let Some(id) = id_of(&row) {
            // Checked against every row, visible or not.
            if rows.iter().any(|existing| id_of(existing) == Some(id)) {
                return Err(duplicate_key(table));
            }
        }
        rows.push(row.clone());
        Ok(vec![row])
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &[&str],
    ) -> Result<Vec<Value>, StoreError> {
        let caller = self.store.caller(&self.token)?;
        let changes = as_object(row)?;
        let candidate = Value::Object(changes.clone());
        if !owned_by(&candidate, caller) {
            return Err(policy_violation());
        }

        let key: Vec<Filter> = on_conflict
            .iter()
            .map(|column| {
                let value = match changes.get(*column) {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => "null".to_string(),
                };
                Filter::eq(*column, value)
            })
            .collect();

        let mut rows = self.store.tables.entry(table.to_string()).or_default();
        match rows.iter().position(|existing| matches_all(existing, &key)) {
            Some(index) => {
                let existing = &mut rows[index];
                if !owned_by(existing, caller) {
                    return Err(policy_violation());
                }
                merge(existing, &changes);
                Ok(vec![existing.clone()])
            }
            None => {
                rows.push(candidate.clone());
                Ok(vec![candidate])
            }
        }
    }

    async fn update(
        &self,
        table: &str,
        row: Value,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError> {
        let caller = self.store.caller(&self.token)?;
        let changes = as_object(row)?;

        let mut changed = Vec::new();
        if let Some(mut rows) = self.store.tables.get_mut(table) {
            for existing in rows.iter_mut() {
                if owned_by(existing, caller) && matches_all(existing, filters) {
                    merge(existing, &changes);
                    changed.push(existing.clone());
                }
            }
        }
        Ok(changed)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError> {
        let caller = self.store.caller(&self.token)?;

        let mut removed = Vec::new();
        if let Some(mut rows) = self.store.tables.get_mut(table) {
            rows.retain(|existing| {
                if owned_by(existing, caller) && matches_all(existing, filters) {
                    removed.push(existing.clone());
                    false
                } else {
                    true
                }
            });
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn two_callers() -> (Arc<MemoryStore>, Uuid, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.register_token("alice", alice);
        store.register_token("bob", bob);
        (store, alice, bob)
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let store = Arc::new(MemoryStore::new());
        let session = store.connect("nobody");

        assert_matches!(session.current_user().await, Err(StoreError::Unauthorized(_)));
        assert_matches!(
            session.select(&Query::from("products")).await,
            Err(StoreError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn rows_are_private_to_their_owner() {
        let (store, alice, _) = two_callers();
        let id = Uuid::new_v4();
        store
            .connect("alice")
            .insert("products", json!({ "id": id.to_string(), "user_id": alice.to_string() }))
            .await
            .unwrap();

        let bob = store.connect("bob");
        assert!(bob.select(&Query::from("products")).await.unwrap().is_empty());

        let changed = bob
            .update(
                "products",
                json!({ "name": "stolen" }),
                &[Filter::eq("id", id)],
            )
            .await
            .unwrap();
        assert!(changed.is_empty());
        assert!(bob
            .delete("products", &[Filter::eq("id", id)])
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.rows("products").len(), 1);
    }

    #[tokio::test]
    async fn insert_for_another_owner_is_rejected() {
        let (store, alice, _) = two_callers();
        let result = store
            .connect("bob")
            .insert("products", json!({ "user_id": alice.to_string() }))
            .await;

        assert_matches!(result, Err(StoreError::Rejected { status: 403, .. }));
    }

    #[tokio::test]
    async fn taken_id_is_a_conflict() {
        let (store, alice, bob) = two_callers();
        let id = Uuid::new_v4().to_string();
        let session = store.connect("alice");
        session
            .insert("products", json!({ "id": id, "user_id": alice.to_string() }))
            .await
            .unwrap();

        let again = session
            .insert("products", json!({ "id": id, "user_id": alice.to_string() }))
            .await;
        assert_matches!(again, Err(StoreError::Rejected { status: 409, .. }));

        // Rows hidden from the caller still hold their key.
        let other = store
            .connect("bob")
            .insert("products", json!({ "id": id, "user_id": bob.to_string() }))
            .await;
        assert_matches!(other, Err(StoreError::Rejected { status: 409, .. }));
        assert_eq!(store.rows("products").len(), 1);
    }

    #[tokio::test]
    async fn range_selects_inclusive_window() {
        let (store, alice, _) = two_callers();
        let session = store.connect("alice");
        for n in 0..25 {
            session
                .insert("products", json!({ "n": n, "user_id": alice.to_string() }))
                .await
                .unwrap();
        }

        let page = session
            .select(&Query::from("products").range(10, 19))
            .await
            .unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0]["n"], 10);
        assert_eq!(page[9]["n"], 19);

        let tail = session
            .select(&Query::from("products").range(20, 29))
            .await
            .unwrap();
        assert_eq!(tail.len(), 5);

        let beyond = session
            .select(&Query::from("products").range(40, 49))
            .await
            .unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn upsert_merges_into_existing_key() {
        let (store, alice, _) = two_callers();
        let session = store.connect("alice");
        let row = |quantity: i64| {
            json!({
                "sku_id": "s1",
                "location_id": "l1",
                "user_id": alice.to_string(),
                "quantity": quantity
            })
        };

        session
            .upsert("inventory", row(3), &["sku_id", "location_id"])
            .await
            .unwrap();
        session
            .upsert("inventory", row(9), &["sku_id", "location_id"])
            .await
            .unwrap();

        let rows = store.rows("inventory");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["quantity"], 9);
    }
}
