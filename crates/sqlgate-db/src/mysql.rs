//! MySQL executor reached through the tunnel's loopback port.

use crate::error::DatabaseError;
use crate::executor::SqlExecutor;
use crate::result::{QueryResult, Table};
use crate::statement::StatementKind;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde_json::{Value, json};
use sqlgate_core::DatabaseCredentials;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, ConnectOptions, Connection, Row, TypeInfo, ValueRef};
use std::time::Duration;

/// Opens one connection per call to `127.0.0.1:<local_port>`.
pub struct MySqlExecutor {
    options: MySqlConnectOptions,
    port: u16,
    user: String,
    database: String,
    connect_timeout: Duration,
}

impl MySqlExecutor {
    pub fn new(local_port: u16, credentials: &DatabaseCredentials, connect_timeout: Duration) -> Self {
        let options = MySqlConnectOptions::new()
            .host("127.0.0.1")
            .port(local_port)
            .username(&credentials.user)
            .password(&credentials.password)
            .database(&credentials.database);

        Self {
            options,
            port: local_port,
            user: credentials.user.clone(),
            database: credentials.database.clone(),
            connect_timeout,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn connect(&self) -> Result<MySqlConnection, DatabaseError> {
        match tokio::time::timeout(self.connect_timeout, self.options.connect()).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(source)) => Err(DatabaseError::Connect {
                port: self.port,
                source,
            }),
            Err(_) => Err(DatabaseError::ConnectTimeout(self.connect_timeout)),
        }
    }
}

impl std::fmt::Debug for MySqlExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlExecutor")
            .field("port", &self.port)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[async_trait]
impl SqlExecutor for MySqlExecutor {
    async fn execute(&self, sql: &str) -> Result<QueryResult, DatabaseError> {
        if sql.trim().is_empty() {
            return Err(DatabaseError::EmptyStatement);
        }

        let kind = StatementKind::classify(sql);
        tracing::debug!(?kind, port = self.port, "Executing SQL");

        let mut conn = self.connect().await?;
        let result = run_statement(&mut conn, sql, kind).await;

        if let Err(e) = conn.close().await {
            tracing::debug!(error = %e, "Error closing MySQL connection");
        }

        match &result {
            Ok(QueryResult::Table(table)) => {
                tracing::debug!(rows = table.row_count(), "Query returned rows")
            }
            Ok(QueryResult::Affected { rows_affected }) => {
                tracing::info!(rows_affected, "Statement committed")
            }
            Err(e) => tracing::warn!(error = %e, "SQL execution failed"),
        }

        result
    }
}

async fn run_statement(
    conn: &mut MySqlConnection,
    sql: &str,
    kind: StatementKind,
) -> Result<QueryResult, DatabaseError> {
    // Text protocol: SHOW and DESCRIBE cannot be prepared.
    match kind {
        StatementKind::Read => {
            let rows = sqlx::Executor::fetch_all(&mut *conn, sqlx::raw_sql(sql)).await?;
            Ok(QueryResult::Table(rows_to_table(&rows)))
        }
        StatementKind::Mutation => {
            // Dropping an uncommitted transaction rolls it back.
            let mut tx = conn.begin().await?;
            let done = sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(sql)).await?;
            tx.commit().await?;
            Ok(QueryResult::Affected {
                rows_affected: done.rows_affected(),
            })
        }
    }
}

fn rows_to_table(rows: &[MySqlRow]) -> Table {
    let columns = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    let rows = rows
        .iter()
        .map(|row| (0..row.columns().len()).map(|i| decode_cell(row, i)).collect())
        .collect();

    Table::new(columns, rows)
}

/// Decode one cell, trying the natural Rust type for each MySQL family.
fn decode_cell(row: &MySqlRow, index: usize) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if !raw.is_null() => {}
        _ => return Value::Null,
    }

    if let Ok(v) = row.try_get::<i64, _>(index) {
        json!(v)
    } else if let Ok(v) = row.try_get::<u64, _>(index) {
        json!(v)
    } else if let Ok(v) = row.try_get::<f64, _>(index) {
        json!(v)
    } else if let Ok(v) = row.try_get::<f32, _>(index) {
        json!(v)
    } else if let Ok(v) = row.try_get::<BigDecimal, _>(index) {
        // Kept as text so no precision is lost.
        Value::String(v.to_string())
    } else if let Ok(v) = row.try_get::<bool, _>(index) {
        json!(v)
    } else if let Ok(v) = row.try_get::<chrono::NaiveDateTime, _>(index) {
        Value::String(v.to_string())
    } else if let Ok(v) = row.try_get::<chrono::DateTime<chrono::Utc>, _>(index) {
        Value::String(v.to_rfc3339())
    } else if let Ok(v) = row.try_get::<chrono::NaiveDate, _>(index) {
        Value::String(v.to_string())
    } else if let Ok(v) = row.try_get::<chrono::NaiveTime, _>(index) {
        Value::String(v.to_string())
    } else if let Ok(v) = row.try_get::<String, _>(index) {
        Value::String(v)
    } else if let Ok(v) = row.try_get::<Value, _>(index) {
        v
    } else if let Ok(v) = row.try_get::<Vec<u8>, _>(index) {
        Value::String(String::from_utf8_lossy(&v).into_owned())
    } else {
        let type_name = row.columns()[index].type_info().name().to_string();
        tracing::debug!(column = index, type_name, "Undecodable column value");
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> DatabaseCredentials {
        DatabaseCredentials::new("app", "s3cret", "shop")
    }

    #[test]
    fn test_debug_hides_password() {
        let executor = MySqlExecutor::new(40123, &credentials(), Duration::from_secs(5));
        let debug = format!("{:?}", executor);
        assert!(debug.contains("40123"));
        assert!(debug.contains("shop"));
        assert!(!debug.contains("s3cret"));
    }

    #[tokio::test]
    async fn test_empty_statement_is_rejected_without_connecting() {
        // Nothing listens on port 1; reaching connect would yield a different error.
        let executor = MySqlExecutor::new(1, &credentials(), Duration::from_secs(5));
        let err = executor.execute("   \n").await.unwrap_err();
        assert!(matches!(err, DatabaseError::EmptyStatement));
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let executor = MySqlExecutor::new(port, &credentials(), Duration::from_secs(5));
        let err = executor.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::Connect { port: p, .. } if p == port
        ));
    }
}
