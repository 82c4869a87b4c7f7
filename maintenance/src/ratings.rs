//! Mayor-ratings table creation
//!
//! The public rating feature lives in the web application; this module only
//! ensures the storage definition exists.

use anyhow::{Context, Result};
use common::db;
use sqlx::MySqlPool;
use tracing::info;

/// Table holding one rating of the mayor per registered user.
pub const RATINGS_TABLE: &str = "calificaciones_alcalde";

/// DDL for the ratings table. The score range and the one-rating-per-user
/// rule are enforced by the definition itself, and `IF NOT EXISTS` makes
/// re-runs safe.
const RATINGS_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS calificaciones_alcalde (
    id INT AUTO_INCREMENT PRIMARY KEY,
    usuario_id INT NOT NULL,
    calificacion INT NOT NULL CHECK (calificacion BETWEEN 1 AND 5),
    comentario TEXT,
    fecha_calificacion TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (usuario_id) REFERENCES usuarios(id) ON DELETE CASCADE,
    UNIQUE KEY unique_calificacion_usuario (usuario_id)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci";

/// Result of an `ensure_ratings_table` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOutcome {
    Created,
    AlreadyExists,
}

/// Outcome of a run given whether the table existed beforehand.
fn creation_outcome(existed: bool) -> TableOutcome {
    if existed {
        TableOutcome::AlreadyExists
    } else {
        TableOutcome::Created
    }
}

/// Create the ratings table if it is missing.
pub async fn ensure_ratings_table(pool: &MySqlPool, schema: &str) -> Result<TableOutcome> {
    let existed = db::table_exists(pool, schema, RATINGS_TABLE).await?;

    sqlx::query(RATINGS_TABLE_DDL)
        .execute(pool)
        .await
        .context(format!("Failed to create table {}", RATINGS_TABLE))?;

    match creation_outcome(existed) {
        TableOutcome::AlreadyExists => {
            info!(table = RATINGS_TABLE, "Table already present, nothing to do");
            Ok(TableOutcome::AlreadyExists)
        }
        TableOutcome::Created => {
            info!(table = RATINGS_TABLE, "Table created");
            Ok(TableOutcome::Created)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ddl_is_rerunnable() {
        assert!(RATINGS_TABLE_DDL.contains("IF NOT EXISTS"));
    }

    #[test]
    fn test_rerun_reports_already_exists() {
        assert_eq!(creation_outcome(true), TableOutcome::AlreadyExists);
        assert_eq!(creation_outcome(false), TableOutcome::Created);
    }

    #[test]
    fn test_ddl_enforces_one_rating_per_user() {
        assert!(RATINGS_TABLE_DDL.contains("UNIQUE KEY unique_calificacion_usuario (usuario_id)"));
        assert!(RATINGS_TABLE_DDL.contains("CHECK (calificacion BETWEEN 1 AND 5)"));
    }
}
