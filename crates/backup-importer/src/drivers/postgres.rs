//! PostgreSQL driver over a deadpool-postgres pool.

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use std::time::Duration;
use tokio_postgres::NoTls;
use tracing::info;

use crate::config::ConnectionProfile;
use crate::core::traits::{is_wildcard, BackupSource, TargetWriter};
use crate::core::value::{Record, Value};
use crate::error::{ImportError, Result};

/// PostgreSQL database handle, usable as source or target.
pub struct PostgresDatabase {
    pool: Pool,
    database: String,
}

impl PostgresDatabase {
    /// Connect and verify the connection with a probe query.
    pub async fn connect(profile: &ConnectionProfile) -> Result<Self> {
        let mut config = tokio_postgres::Config::new();
        config.host(&profile.host);
        config.port(profile.effective_port());
        config.dbname(&profile.database);
        config.user(&profile.username);
        config.password(&profile.password);
        config.connect_timeout(Duration::from_secs(30));

        let manager = Manager::from_config(
            config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let pool = Pool::builder(manager)
            .max_size(4)
            .build()
            .map_err(|e| ImportError::connection(e.to_string(), "creating PostgreSQL pool"))?;

        // Verify connectivity up front
        let client = pool
            .get()
            .await
            .map_err(|e| ImportError::connection(e.to_string(), "connecting to PostgreSQL"))?;
        client
            .simple_query("SELECT 1")
            .await
            .map_err(|e| ImportError::connection(e.to_string(), "testing PostgreSQL connection"))?;

        info!(
            "Connected to PostgreSQL: {}:{}/{}",
            profile.host,
            profile.effective_port(),
            profile.database
        );

        Ok(Self {
            pool,
            database: profile.database.clone(),
        })
    }

    async fn client(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            ImportError::connection(
                e.to_string(),
                format!("acquiring PostgreSQL connection to {}", self.database),
            )
        })
    }
}

#[async_trait]
impl BackupSource for PostgresDatabase {
    async fn fetch_rows(&self, table: &str, columns: &[String]) -> Result<Vec<Record>> {
        let client = self.client().await?;

        let projection = if is_wildcard(columns) {
            "*".to_string()
        } else {
            columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let sql = format!("SELECT {} FROM {}", projection, quote_ident(table));

        let rows = client.query(&sql, &[]).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = Record::new();
            for (idx, column) in row.columns().iter().enumerate() {
                record.push(column.name(), convert_pg_value(row, idx, column.type_().name()));
            }
            out.push(record);
        }
        Ok(out)
    }

    async fn ping(&self) -> Result<()> {
        let client = self.client().await?;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close();
        Ok(())
    }

    fn driver(&self) -> &str {
        "postgres"
    }
}

#[async_trait]
impl TargetWriter for PostgresDatabase {
    async fn insert(&self, table: &str, record: &Record) -> Result<()> {
        let client = self.client().await?;
        let sql = build_insert_sql(table, record);
        client.simple_query(&sql).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        BackupSource::ping(self).await
    }

    async fn close(&self) -> Result<()> {
        self.pool.close();
        Ok(())
    }

    fn driver(&self) -> &str {
        "postgres"
    }
}

/// Quote a PostgreSQL identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build INSERT SQL with literal values (no parameters).
fn build_insert_sql(table: &str, record: &Record) -> String {
    // An all-defaults row still counts as one insert.
    if record.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table));
    }

    let col_list: String = record
        .columns()
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let values: Vec<String> = record.values().iter().map(value_to_literal).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        col_list,
        values.join(", ")
    )
}

/// Escape single quotes for SQL string literals.
fn escape_sql_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Convert a Value to a SQL literal string.
fn value_to_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::I16(n) => n.to_string(),
        Value::I32(n) => n.to_string(),
        Value::I64(n) => n.to_string(),
        Value::F32(n) => n.to_string(),
        Value::F64(n) => n.to_string(),
        Value::Text(s) => format!("'{}'", escape_sql_string(s)),
        Value::Bytes(b) => format!("'\\x{}'::bytea", hex::encode(b)),
        Value::Uuid(u) => format!("'{}'::uuid", u),
        Value::Decimal(d) => format!("{}::numeric", d),
        Value::DateTime(dt) => format!("'{}'::timestamp", dt.format("%Y-%m-%d %H:%M:%S%.6f")),
        Value::DateTimeOffset(dt) => format!("'{}'::timestamptz", dt.to_rfc3339()),
        Value::Date(d) => format!("'{}'::date", d),
        Value::Time(t) => format!("'{}'::time", t),
    }
}

/// Convert a PostgreSQL row value to Value based on column type.
fn convert_pg_value(row: &tokio_postgres::Row, idx: usize, data_type: &str) -> Value {
    match data_type {
        "bool" => row
            .try_get::<_, Option<bool>>(idx)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "int2" => row
            .try_get::<_, Option<i16>>(idx)
            .ok()
            .flatten()
            .map(Value::I16)
            .unwrap_or(Value::Null),
        "int4" => row
            .try_get::<_, Option<i32>>(idx)
            .ok()
            .flatten()
            .map(Value::I32)
            .unwrap_or(Value::Null),
        "int8" => row
            .try_get::<_, Option<i64>>(idx)
            .ok()
            .flatten()
            .map(Value::I64)
            .unwrap_or(Value::Null),
        "float4" => row
            .try_get::<_, Option<f32>>(idx)
            .ok()
            .flatten()
            .map(Value::F32)
            .unwrap_or(Value::Null),
        "float8" => row
            .try_get::<_, Option<f64>>(idx)
            .ok()
            .flatten()
            .map(Value::F64)
            .unwrap_or(Value::Null),
        "uuid" => row
            .try_get::<_, Option<uuid::Uuid>>(idx)
            .ok()
            .flatten()
            .map(Value::Uuid)
            .unwrap_or(Value::Null),
        "numeric" => row
            .try_get::<_, Option<rust_decimal::Decimal>>(idx)
            .ok()
            .flatten()
            .map(Value::Decimal)
            .unwrap_or(Value::Null),
        "date" => row
            .try_get::<_, Option<chrono::NaiveDate>>(idx)
            .ok()
            .flatten()
            .map(Value::Date)
            .unwrap_or(Value::Null),
        "time" => row
            .try_get::<_, Option<chrono::NaiveTime>>(idx)
            .ok()
            .flatten()
            .map(Value::Time)
            .unwrap_or(Value::Null),
        "timestamp" => row
            .try_get::<_, Option<chrono::NaiveDateTime>>(idx)
            .ok()
            .flatten()
            .map(Value::DateTime)
            .unwrap_or(Value::Null),
        "timestamptz" => row
            .try_get::<_, Option<chrono::DateTime<chrono::FixedOffset>>>(idx)
            .ok()
            .flatten()
            .map(Value::DateTimeOffset)
            .unwrap_or(Value::Null),
        "bytea" => row
            .try_get::<_, Option<Vec<u8>>>(idx)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        "json" | "jsonb" => row
            .try_get::<_, Option<serde_json::Value>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Text(v.to_string()))
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<_, Option<String>>(idx)
            .ok()
            .flatten()
            .map(Value::Text)
            .unwrap_or(Value::Null),
    }
}
