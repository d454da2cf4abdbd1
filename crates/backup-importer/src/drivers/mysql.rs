//! MySQL/MariaDB driver over a SQLx pool.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, MySql, Row, TypeInfo, ValueRef};
use tracing::info;

use crate::config::ConnectionProfile;
use crate::core::traits::{is_wildcard, BackupSource, TargetWriter};
use crate::core::value::{Record, Value};
use crate::error::{ImportError, Result};

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// MySQL/MariaDB database handle, usable as source or target.
pub struct MySqlDatabase {
    pool: MySqlPool,
    database: String,
}

impl MySqlDatabase {
    /// Connect and verify the connection with a probe query.
    pub async fn connect(profile: &ConnectionProfile) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&profile.host)
            .port(profile.effective_port())
            .database(&profile.database)
            .username(&profile.username)
            .password(&profile.password);

        let pool = MySqlPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| ImportError::connection(e.to_string(), "connecting to MySQL"))?;

        // Test connection
        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .map_err(|e| ImportError::connection(e.to_string(), "testing MySQL connection"))?;

        info!(
            "Connected to MySQL: {}:{}/{}",
            profile.host,
            profile.effective_port(),
            profile.database
        );

        Ok(Self {
            pool,
            database: profile.database.clone(),
        })
    }
}

#[async_trait]
impl BackupSource for MySqlDatabase {
    async fn fetch_rows(&self, table: &str, columns: &[String]) -> Result<Vec<Record>> {
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

        let rows: Vec<MySqlRow> = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = Record::new();
            for (idx, column) in row.columns().iter().enumerate() {
                record.push(column.name(), convert_mysql_value(row, idx, column.type_info().name()));
            }
            out.push(record);
        }
        Ok(out)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    fn driver(&self) -> &str {
        "mysql"
    }
}

#[async_trait]
impl TargetWriter for MySqlDatabase {
    async fn insert(&self, table: &str, record: &Record) -> Result<()> {
        // An all-defaults row still counts as one insert.
        if record.is_empty() {
            let sql = format!("INSERT INTO {} () VALUES ()", quote_ident(table));
            sqlx::query(&sql).execute(&self.pool).await?;
            return Ok(());
        }

        let column_list = record
            .columns()
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; record.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            column_list,
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for value in record.values() {
            query = bind_value(query, value);
        }
        query.execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        BackupSource::ping(self).await
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    fn driver(&self) -> &str {
        "mysql"
    }
}

/// Quote a MySQL identifier.
fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Convert a MySQL row value to Value based on column type.
fn convert_mysql_value(row: &MySqlRow, idx: usize, type_name: &str) -> Value {
    let type_name = type_name.to_lowercase();

    // Handle NULL values
    let is_null: bool = row.try_get_raw(idx).map(|r| r.is_null()).unwrap_or(true);
    if is_null {
        return Value::Null;
    }

    match type_name.as_str() {
        "tinyint" => row
            .try_get::<i8, _>(idx)
            .map(|v| Value::I16(v as i16))
            .unwrap_or(Value::Null),
        "smallint" => row
            .try_get::<i16, _>(idx)
            .map(Value::I16)
            .unwrap_or(Value::Null),
        "mediumint" | "int" | "integer" => row
            .try_get::<i32, _>(idx)
            .map(Value::I32)
            .unwrap_or(Value::Null),
        "bigint" => row
            .try_get::<i64, _>(idx)
            .map(Value::I64)
            .unwrap_or(Value::Null),
        "float" => row
            .try_get::<f32, _>(idx)
            .map(Value::F32)
            .unwrap_or(Value::Null),
        "double" | "real" => row
            .try_get::<f64, _>(idx)
            .map(Value::F64)
            .unwrap_or(Value::Null),
        "decimal" | "numeric" => row
            .try_get::<rust_decimal::Decimal, _>(idx)
            .map(Value::Decimal)
            .unwrap_or(Value::Null),
        "bit" | "boolean" | "bool" => row
            .try_get::<bool, _>(idx)
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "char" | "varchar" | "text" | "tinytext" | "mediumtext" | "longtext" | "enum" | "set" => {
            row.try_get::<String, _>(idx)
                .map(Value::Text)
                .unwrap_or(Value::Null)
        }
        "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => row
            .try_get::<Vec<u8>, _>(idx)
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        "date" => row
            .try_get::<chrono::NaiveDate, _>(idx)
            .map(Value::Date)
            .unwrap_or(Value::Null),
        "time" => row
            .try_get::<chrono::NaiveTime, _>(idx)
            .map(Value::Time)
            .unwrap_or(Value::Null),
        "datetime" | "timestamp" => row
            .try_get::<chrono::NaiveDateTime, _>(idx)
            .map(Value::DateTime)
            .unwrap_or(Value::Null),
        // MySQL stores UUIDs as CHAR(36)
        "uuid" => row
            .try_get::<String, _>(idx)
            .ok()
            .and_then(|s| uuid::Uuid::parse_str(&s).ok())
            .map(Value::Uuid)
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<String, _>(idx)
            .map(Value::Text)
            .unwrap_or(Value::Null),
    }
}

/// Bind a Value to a query as the next placeholder.
fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(v) => query.bind(*v),
        Value::I16(v) => query.bind(*v),
        Value::I32(v) => query.bind(*v),
        Value::I64(v) => query.bind(*v),
        Value::F32(v) => query.bind(*v),
        Value::F64(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        Value::Bytes(v) => query.bind(v.clone()),
        Value::Uuid(v) => query.bind(v.to_string()),
        Value::Decimal(v) => query.bind(*v),
        Value::Date(v) => query.bind(*v),
        Value::Time(v) => query.bind(*v),
        Value::DateTime(v) => query.bind(*v),
        // MySQL has no offset type, store as UTC
        Value::DateTimeOffset(v) => query.bind(v.naive_utc()),
    }
}
