use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

use super::{Filter, Query, Store, StoreError};
use crate::metrics;

/// A domain record persisted in one collection.
///
/// `Row` is the stored shape. For most records it is the record itself; a
/// record whose API shape differs from its stored shape converts in both
/// directions without loss.
pub trait Record: Clone + Send + Sync + Sized {
    const TABLE: &'static str;

    type Row: Serialize + DeserializeOwned + Send;

    fn into_row(self) -> Self::Row;

    fn from_row(row: Self::Row) -> Self;
}

/// A record keyed by a pair of columns, written with upsert semantics.
pub trait CompositeKey: Record {
    const KEY: [&'static str; 2];
}

/// Implements [`Record`] for a type stored in its own API shape.
#[macro_export]
macro_rules! stored_as_is {
    ($ty:ty, $table:literal) => {
        impl $crate::store::Record for $ty {
            const TABLE: &'static str = $table;

            type Row = $ty;

            fn into_row(self) -> Self::Row {
                self
            }

            fn from_row(row: Self::Row) -> Self {
                row
            }
        }
    };
}

/// Typed view over one collection of a [`Store`].
pub struct Table<'a, T> {
    store: &'a dyn Store,
    _record: PhantomData<T>,
}

impl<'a, T: Record> Table<'a, T> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Inserts one record and returns the stored representation, or the
    /// submitted record when the store echoes nothing back.
    pub async fn insert(&self, record: T) -> Result<T, StoreError> {
        let submitted = record.clone();
        let result = match encode(record) {
            Ok(row) => self.store.insert(T::TABLE, row).await,
            Err(err) => Err(err),
        };
        let rows = observe::<T, _>("insert", result)?;
        Ok(decode::<T>(rows)?.into_iter().next().unwrap_or(submitted))
    }

    pub async fn list(&self, filters: Vec<Filter>) -> Result<Vec<T>, StoreError> {
        let query = Query::from(T::TABLE).filters(filters);
        let rows = observe::<T, _>("select", self.store.select(&query).await)?;
        decode(rows)
    }

    /// Lists the records in the inclusive index range `[start, end]`.
    pub async fn list_range(
        &self,
        filters: Vec<Filter>,
        start: u64,
        end: u64,
    ) -> Result<Vec<T>, StoreError> {
        let query = Query::from(T::TABLE).filters(filters).range(start, end);
        let rows = observe::<T, _>("select", self.store.select(&query).await)?;
        decode(rows)
    }

    pub async fn first(&self, filters: Vec<Filter>) -> Result<Option<T>, StoreError> {
        Ok(self.list(filters).await?.into_iter().next())
    }

    /// Applies `record` to every row matching `filters` and returns the rows
    /// the store reports as changed.
    pub async fn update(&self, record: T, filters: Vec<Filter>) -> Result<Vec<T>, StoreError> {
        let result = match encode(record) {
            Ok(row) => self.store.update(T::TABLE, row, &filters).await,
            Err(err) => Err(err),
        };
        decode(observe::<T, _>("update", result)?)
    }

    /// Deletes every row matching `filters` and returns how many went away.
    pub async fn delete(&self, filters: Vec<Filter>) -> Result<usize, StoreError> {
        let result = self.store.delete(T::TABLE, &filters).await;
        Ok(observe::<T, _>("delete", result)?.len())
    }
}

impl<'a, T: CompositeKey> Table<'a, T> {
    /// Inserts the record or overwrites the one sharing its composite key.
    pub async fn upsert(&self, record: T) -> Result<T, StoreError> {
        let submitted = record.clone();
        let result = match encode(record) {
            Ok(row) => self.store.upsert(T::TABLE, row, &T::KEY).await,
            Err(err) => Err(err),
        };
        let rows = observe::<T, _>("upsert", result)?;
        Ok(decode::<T>(rows)?.into_iter().next().unwrap_or(submitted))
    }
}

fn encode<T: Record>(record: T) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(record.into_row())?)
}

fn decode<T: Record>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| Ok(T::from_row(serde_json::from_value(row)?)))
        .collect()
}

fn observe<T: Record, R>(
    operation: &'static str,
    result: Result<R, StoreError>,
) -> Result<R, StoreError> {
    metrics::record_store_call(T::TABLE, operation, result.is_ok());
    result
}
