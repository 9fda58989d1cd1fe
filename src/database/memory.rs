use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::store::{Row, Store};
use crate::filter::filter_order::FilterOrder;
use crate::filter::{FilterData, FilterMatch};
use crate::types::Table;

/// In-process store evaluating the same filter language as `PgStore`.
///
/// Backs `STORE_BACKEND=memory` and the test suites. Tables can be switched into a failing
/// state to exercise degraded reads.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, Vec<Row>>>,
    failing: RwLock<HashSet<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation on `table` fail with `DatabaseError::Unavailable`
    pub async fn fail_table(&self, table: &'static Table) {
        self.failing.write().await.insert(table.name);
    }

    pub async fn restore_table(&self, table: &'static Table) {
        self.failing.write().await.remove(table.name);
    }

    async fn check_available(&self, table: &'static Table) -> Result<(), DatabaseError> {
        if self.failing.read().await.contains(table.name) {
            return Err(DatabaseError::Unavailable(format!("table {} is unavailable", table.name)));
        }
        Ok(())
    }

    fn check_columns(table: &Table, row: &Row) -> Result<(), DatabaseError> {
        for name in row.keys() {
            if !table.has_column(name) {
                return Err(DatabaseError::QueryError(format!("unknown column {}.{}", table.name, name)));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn select(&self, table: &'static Table, filter: FilterData) -> Result<Vec<Row>, DatabaseError> {
        self.check_available(table).await?;
        let node = FilterMatch::compile(table, filter.where_clause.as_ref())?;
        let order = match filter.order {
            Some(ref spec) => FilterOrder::validate_and_parse(table, spec)?,
            None => vec![],
        };

        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(table.name)
            .map(|rows| rows.iter().filter(|r| FilterMatch::matches(table, &node, r)).cloned().collect())
            .unwrap_or_default();
        drop(tables);

        FilterMatch::sort(table, &order, &mut rows);

        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, table: &'static Table, where_clause: Option<Value>) -> Result<i64, DatabaseError> {
        self.check_available(table).await?;
        let node = FilterMatch::compile(table, where_clause.as_ref())?;
        let tables = self.tables.read().await;
        let count = tables
            .get(table.name)
            .map(|rows| rows.iter().filter(|r| FilterMatch::matches(table, &node, r)).count())
            .unwrap_or(0);
        Ok(count as i64)
    }

    async fn insert(&self, table: &'static Table, row: Row) -> Result<Row, DatabaseError> {
        self.check_available(table).await?;
        Self::check_columns(table, &row)?;

        // Columns the caller left out are stored as NULL, as Postgres would
        let mut stored = Row::new();
        for column in table.columns {
            stored.insert(column.name.to_string(), row.get(column.name).cloned().unwrap_or(Value::Null));
        }

        let mut tables = self.tables.write().await;
        tables.entry(table.name).or_default().push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, table: &'static Table, where_clause: Value, changes: Row) -> Result<Vec<Row>, DatabaseError> {
        self.check_available(table).await?;
        Self::check_columns(table, &changes)?;
        let node = FilterMatch::compile(table, Some(&where_clause))?;

        let mut tables = self.tables.write().await;
        let mut updated = vec![];
        if let Some(rows) = tables.get_mut(table.name) {
            for row in rows.iter_mut().filter(|r| FilterMatch::matches(table, &node, r)) {
                for (k, v) in &changes {
                    row.insert(k.clone(), v.clone());
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &'static Table, where_clause: Value) -> Result<u64, DatabaseError> {
        self.check_available(table).await?;
        let node = FilterMatch::compile(table, Some(&where_clause))?;

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table.name) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !FilterMatch::matches(table, &node, r));
        Ok((before - rows.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
