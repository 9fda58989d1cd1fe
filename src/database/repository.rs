use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Entity;
use crate::database::store::{Row, Store};
use crate::filter::FilterData;

/// Typed access to one entity table over a [`Store`]
pub struct Repository<T> {
    store: Arc<dyn Store>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _phantom: PhantomData,
        }
    }
}

/// Serialize any payload into a store row. Non-object payloads are rejected.
pub fn to_row<S: Serialize>(value: &S) -> Result<Row, DatabaseError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!(
            "expected an object payload, got {}",
            other
        ))),
    }
}

fn decode<T: Entity>(rows: Vec<Row>) -> Result<Vec<T>, DatabaseError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)).map_err(DatabaseError::from))
        .collect()
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Fill in the default order when the caller did not pick one
    fn ordered(mut filter_data: FilterData) -> FilterData {
        if filter_data.order.is_none() {
            filter_data.order = Some(Value::String(T::DEFAULT_ORDER.to_string()));
        }
        filter_data
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        let rows = self.store.select(T::TABLE, Self::ordered(filter_data)).await?;
        decode(rows)
    }

    pub async fn select_one(&self, filter_data: FilterData) -> Result<Option<T>, DatabaseError> {
        let filter_data = filter_data.limit(Some(1));
        Ok(self.select_any(filter_data).await?.into_iter().next())
    }

    pub async fn select_404(&self, filter_data: FilterData) -> Result<T, DatabaseError> {
        self.select_one(filter_data)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} record not found", T::TABLE.name)))
    }

    pub async fn select_ids(&self, ids: &[Uuid]) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        self.select_any(FilterData::where_(json!({ "id": { "$in": ids } })))
            .await
    }

    pub async fn count(&self, where_clause: Option<Value>) -> Result<i64, DatabaseError> {
        self.store.count(T::TABLE, where_clause).await
    }

    /// Insert a payload, stamping `id` and timestamps for columns the payload leaves out
    pub async fn insert<S: Serialize>(&self, payload: &S) -> Result<T, DatabaseError> {
        let mut row = to_row(payload)?;
        let now = json!(Utc::now());
        if T::TABLE.has_column("id") && !row.contains_key("id") {
            row.insert("id".to_string(), json!(Uuid::new_v4()));
        }
        for stamp in ["created_at", "updated_at"] {
            if T::TABLE.has_column(stamp) && !row.contains_key(stamp) {
                row.insert(stamp.to_string(), now.clone());
            }
        }

        let stored = self.store.insert(T::TABLE, row).await?;
        Ok(serde_json::from_value(Value::Object(stored))?)
    }

    /// Update every row matching `where_clause`, bumping `updated_at` where the table has one
    pub async fn update_where<S: Serialize>(&self, where_clause: Value, changes: &S) -> Result<Vec<T>, DatabaseError> {
        let mut changes = to_row(changes)?;
        if T::TABLE.has_column("updated_at") {
            changes.insert("updated_at".to_string(), json!(Utc::now()));
        }
        let rows = self.store.update(T::TABLE, where_clause, changes).await?;
        decode(rows)
    }

    pub async fn update_404<S: Serialize>(&self, id: Uuid, changes: &S) -> Result<T, DatabaseError> {
        self.update_where(json!({ "id": id }), changes)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::NotFound(format!("{} record not found", T::TABLE.name)))
    }

    pub async fn delete_where(&self, where_clause: Value) -> Result<u64, DatabaseError> {
        self.store.delete(T::TABLE, where_clause).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, DatabaseError> {
        self.delete_where(json!({ "id": id })).await
    }
}
