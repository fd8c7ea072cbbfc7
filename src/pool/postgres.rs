//! PostgreSQL executor backed by a sqlx pool

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{Column, Postgres, Row, TypeInfo};
use uuid::Uuid;

use super::SqlExecutor;
use crate::config::PoolConfig;
use crate::error::CompatResult;
use crate::observability::Event;
use crate::query::{SqlParam, Statement};
use crate::Document;

/// Executor over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool according to `config`
    pub async fn connect(config: &PoolConfig) -> CompatResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.database_url)
            .await?;

        tracing::info!(
            event = Event::PoolConnected.as_str(),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "connection pool ready"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SqlExecutor for PgExecutor {
    async fn fetch_all(&self, statement: &Statement) -> CompatResult<Vec<Document>> {
        let rows = bind_params(sqlx::query(&statement.sql), &statement.params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_row).collect()
    }

    async fn execute(&self, statement: &Statement) -> CompatResult<u64> {
        let result = bind_params(sqlx::query(&statement.sql), &statement.params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Null => query.bind(None::<String>),
            SqlParam::Bool(b) => query.bind(*b),
            SqlParam::Int(i) => query.bind(*i),
            SqlParam::Float(x) => query.bind(*x),
            SqlParam::Text(s) => query.bind(s.clone()),
            SqlParam::Json(v) => query.bind(Json(v.clone())),
        };
    }
    query
}

/// Decodes a row by column type
///
/// Types without a dedicated arm are read as text; a column that can't be
/// read as text fails the whole row.
fn decode_row(row: &PgRow) -> CompatResult<Document> {
    let mut document = Document::new();

    for column in row.columns() {
        let idx = column.ordinal();
        let value = match column.type_info().name() {
            "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(Value::from),
            "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(Value::from),
            "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(Value::from),
            "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(Value::from),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(idx)?
                .map(|x| Value::from(f64::from(x))),
            "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(Value::from),
            "JSON" | "JSONB" => row.try_get::<Option<Json<Value>>, _>(idx)?.map(|j| j.0),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(idx)?
                .map(|t| Value::String(t.to_rfc3339())),
            "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(idx)?
                .map(|t| Value::String(t.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(idx)?
                .map(|d| Value::String(d.to_string())),
            "UUID" => row
                .try_get::<Option<Uuid>, _>(idx)?
                .map(|u| Value::String(u.to_string())),
            _ => row.try_get::<Option<String>, _>(idx)?.map(Value::String),
        };
        document.insert(column.name().to_string(), value.unwrap_or(Value::Null));
    }

    Ok(document)
}
