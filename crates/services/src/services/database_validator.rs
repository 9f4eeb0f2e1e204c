//! Startup check that the schema this server expects is actually present.

use db::REQUIRED_TABLES;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DatabaseValidationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("missing tables: {}", .0.join(", "))]
    MissingTables(Vec<String>),
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub migrations_applied: i64,
    pub latest_migration: Option<String>,
}

pub struct DatabaseValidator {
    pool: SqlitePool,
}

impl DatabaseValidator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fails if any table in `REQUIRED_TABLES` is absent.
    pub async fn validate(&self) -> Result<SchemaReport, DatabaseValidationError> {
        let missing = self.missing_tables(REQUIRED_TABLES).await?;
        if !missing.is_empty() {
            warn!(?missing, "Database schema incomplete");
            return Err(DatabaseValidationError::MissingTables(missing));
        }

        let migrations_applied = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        let latest_migration = sqlx::query_scalar::<_, String>(
            "SELECT description FROM _sqlx_migrations WHERE success = 1 ORDER BY version DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        info!(migrations_applied, ?latest_migration, "Database schema OK");
        Ok(SchemaReport {
            migrations_applied,
            latest_migration,
        })
    }

    pub async fn missing_tables(
        &self,
        tables: &[&str],
    ) -> Result<Vec<String>, DatabaseValidationError> {
        let mut missing = Vec::new();
        for table in tables {
            let exists = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?
                > 0;
            if !exists {
                missing.push(table.to_string());
            }
        }
        Ok(missing)
    }
}
