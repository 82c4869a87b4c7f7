//! MySQL connection and introspection helpers
//!
//! Each maintenance tool opens one connection, issues its statements
//! sequentially, and exits. The helpers here cover the shared pieces:
//! connecting, reading server variables, and inspecting schema metadata
//! through INFORMATION_SCHEMA.

use anyhow::{Context, Result};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::debug;

use crate::config::DbConfig;

/// Connect to the application database.
///
/// The pool is capped at one connection to match the strictly sequential,
/// single-connection behavior these tools rely on.
fn connect_options(config: &DbConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
}

pub async fn connect(config: &DbConfig) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options(config))
        .await
        .context(format!("Failed to connect to {}", config.display_url()))?;

    Ok(pool)
}

/// Read a server variable via `SHOW VARIABLES LIKE`.
///
/// Returns `None` if the server does not know the variable. The name comes
/// from our own constants, never from user input.
pub async fn server_variable(pool: &MySqlPool, name: &str) -> Result<Option<String>> {
    let sql = format!("SHOW VARIABLES LIKE '{}'", name);
    debug!(variable = name, "Reading server variable");

    let row: Option<(String, String)> = sqlx::query_as(&sql)
        .fetch_optional(pool)
        .await
        .context(format!("Failed to read server variable {}", name))?;

    Ok(row.map(|(_, value)| value))
}

/// Set a global server variable.
///
/// Requires SUPER or SYSTEM_VARIABLES_ADMIN; callers treat failure as a
/// privilege warning rather than a fatal error.
pub async fn set_global_variable(pool: &MySqlPool, name: &str, value: &str) -> Result<()> {
    let sql = format!("SET GLOBAL {} = {}", name, value);

    sqlx::query(&sql)
        .execute(pool)
        .await
        .context(format!("Failed to set global variable {}", name))?;

    Ok(())
}

/// Type information for a single table column.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ColumnInfo {
    #[sqlx(rename = "COLUMN_NAME")]
    pub name: String,
    #[sqlx(rename = "DATA_TYPE")]
    pub data_type: String,
    #[sqlx(rename = "CHARACTER_MAXIMUM_LENGTH")]
    pub max_length: Option<i64>,
}

/// Look up the types of specific columns via INFORMATION_SCHEMA.
///
/// Columns that do not exist are simply absent from the result.
pub async fn column_types(
    pool: &MySqlPool,
    schema: &str,
    table: &str,
    columns: &[&str],
) -> Result<Vec<ColumnInfo>> {
    // An empty IN () is invalid MySQL
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "SELECT COLUMN_NAME, DATA_TYPE, \
         CAST(CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS CHARACTER_MAXIMUM_LENGTH \
         FROM INFORMATION_SCHEMA.COLUMNS \
         WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND COLUMN_NAME IN ({}) \
         ORDER BY COLUMN_NAME",
        placeholders
    );

    let mut query = sqlx::query_as::<_, ColumnInfo>(&sql).bind(schema).bind(table);
    for column in columns {
        query = query.bind(*column);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context(format!("Failed to inspect columns of {}.{}", schema, table))?;

    Ok(rows)
}

/// Check whether a table exists in the given schema.
pub async fn table_exists(pool: &MySqlPool, schema: &str, table: &str) -> Result<bool> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM INFORMATION_SCHEMA.TABLES \
         WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?",
    )
    .bind(schema)
    .bind(table)
    .fetch_one(pool)
    .await
    .context(format!("Failed to check existence of {}.{}", schema, table))?;

    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // connect_lazy: no server is contacted until a statement actually runs,
    // so this pool is enough to exercise code paths that never query.
    fn lazy_pool() -> MySqlPool {
        let config = DbConfig {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "municipalidad_yau".to_string(),
        };
        MySqlPoolOptions::new().connect_lazy_with(connect_options(&config))
    }

    #[tokio::test]
    async fn test_column_types_with_no_columns_issues_no_query() {
        let pool = lazy_pool();
        let columns = column_types(&pool, "municipalidad_yau", "tramites", &[])
            .await
            .unwrap();
        assert!(columns.is_empty());
    }
}
