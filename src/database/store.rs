use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::database::manager::DatabaseError;
use crate::filter::FilterData;
use crate::types::Table;

/// A row as it crosses the store boundary: column name -> JSON value
pub type Row = Map<String, Value>;

/// The relational store the access layer runs against.
///
/// Single-statement operations only. No transactions are assumed, so callers composing
/// several calls must tolerate rows changing in between.
#[async_trait]
pub trait Store: Send + Sync {
    /// Backend name for logs and health output
    fn name(&self) -> &'static str;

    async fn select(&self, table: &'static Table, filter: FilterData) -> Result<Vec<Row>, DatabaseError>;

    async fn count(&self, table: &'static Table, where_clause: Option<Value>) -> Result<i64, DatabaseError>;

    /// Insert a fully populated row, returning it as stored
    async fn insert(&self, table: &'static Table, row: Row) -> Result<Row, DatabaseError>;

    /// Apply `changes` to every row matching `where_clause`, returning the updated rows
    async fn update(&self, table: &'static Table, where_clause: Value, changes: Row) -> Result<Vec<Row>, DatabaseError>;

    /// Delete every row matching `where_clause`, returning the affected row count
    async fn delete(&self, table: &'static Table, where_clause: Value) -> Result<u64, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
