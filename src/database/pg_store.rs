use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row as _};

use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::store::{Row, Store};
use crate::filter::{Filter, FilterData, SqlResult};
use crate::types::Table;

/// Postgres-backed store. Every query is generated by `Filter` with typed parameter casts.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_records(&self, sql: &SqlResult) -> Result<Vec<Row>, DatabaseError> {
        let started = Instant::now();
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        log_query(&sql.query, started);

        rows.into_iter()
            .map(|row| {
                let record: Value = row.try_get("record")?;
                match record {
                    Value::Object(map) => Ok(map),
                    other => Err(DatabaseError::QueryError(format!("expected object record, got {}", other))),
                }
            })
            .collect()
    }

    fn assignments(table: &Table, row: &Row, starting_param_index: usize) -> Result<(Vec<String>, Vec<String>, Vec<Value>), DatabaseError> {
        let mut columns = Vec::with_capacity(row.len());
        let mut placeholders = Vec::with_capacity(row.len());
        let mut params = Vec::with_capacity(row.len());

        for (i, (name, value)) in row.iter().enumerate() {
            let column = table
                .column(name)
                .ok_or_else(|| DatabaseError::QueryError(format!("unknown column {}.{}", table.name, name)))?;
            columns.push(format!("\"{}\"", column.name));
            placeholders.push(format!("${}::{}", starting_param_index + i + 1, column.kind.pg_cast()));
            params.push(value.clone());
        }
        Ok((columns, placeholders, params))
    }
}

#[async_trait]
impl Store for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn select(&self, table: &'static Table, filter_data: FilterData) -> Result<Vec<Row>, DatabaseError> {
        let mut filter = Filter::new(table);
        filter.assign(filter_data)?;
        let sql = filter.to_sql()?;
        self.fetch_records(&sql).await
    }

    async fn count(&self, table: &'static Table, where_clause: Option<Value>) -> Result<i64, DatabaseError> {
        let mut filter = Filter::new(table);
        if let Some(where_clause) = where_clause {
            filter.where_clause(where_clause)?;
        }
        let sql = filter.to_count_sql()?;

        let started = Instant::now();
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        log_query(&sql.query, started);

        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn insert(&self, table: &'static Table, row: Row) -> Result<Row, DatabaseError> {
        let (columns, placeholders, params) = Self::assignments(table, &row, 0)?;
        let query = format!(
            "INSERT INTO \"{0}\" ({1}) VALUES ({2}) RETURNING to_jsonb(\"{0}\".*) AS record",
            table.name,
            columns.join(", "),
            placeholders.join(", ")
        );

        self.fetch_records(&SqlResult { query, params })
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::QueryError(format!("insert into {} returned no row", table.name)))
    }

    async fn update(&self, table: &'static Table, where_clause: Value, changes: Row) -> Result<Vec<Row>, DatabaseError> {
        let (columns, placeholders, mut params) = Self::assignments(table, &changes, 0)?;
        let set_clause = columns
            .iter()
            .zip(placeholders.iter())
            .map(|(c, p)| format!("{} = {}", c, p))
            .collect::<Vec<_>>()
            .join(", ");

        let mut filter = Filter::new(table);
        filter.where_clause(where_clause)?;
        let where_sql = filter.to_where_sql(params.len())?;
        params.extend(where_sql.params);

        let query = format!(
            "UPDATE \"{0}\" SET {1} WHERE {2} RETURNING to_jsonb(\"{0}\".*) AS record",
            table.name, set_clause, where_sql.query
        );
        self.fetch_records(&SqlResult { query, params }).await
    }

    async fn delete(&self, table: &'static Table, where_clause: Value) -> Result<u64, DatabaseError> {
        let mut filter = Filter::new(table);
        filter.where_clause(where_clause)?;
        let where_sql = filter.to_where_sql(0)?;
        let query = format!("DELETE FROM \"{}\" WHERE {}", table.name, where_sql.query);

        let started = Instant::now();
        let mut q = sqlx::query(&query);
        for p in where_sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let result = q.execute(&self.pool).await?;
        log_query(&query, started);

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

fn log_query(query: &str, started: Instant) {
    let database = &config::config().database;
    let elapsed = started.elapsed();
    if database.enable_query_logging {
        tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "{}", query);
    }
    if elapsed.as_millis() as u64 > database.slow_query_threshold_ms {
        tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "Slow query: {}", query);
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // Placeholders are cast per column; structured values travel as jsonb
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
