use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, Executor, PgPool};
use std::time::Duration;
use tracing::info;

use super::store::StoreError;
use crate::config::DatabaseConfig;
use crate::models::Language;

const SCHEMA: &str = include_str!("schema.sql");

/// Owns the Postgres pool and brings the schema up to date on connect
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let raw = config.url.as_deref().ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;
        let url = url::Url::parse(raw).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(StoreError::InvalidDatabaseUrl);
        }

        let mut options: PgConnectOptions = raw.parse()?;
        if !config.enable_query_logging {
            options = options.disable_statement_logging();
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await?;

        info!(
            "Connected to database {} (max {} connections)",
            url.path().trim_start_matches('/'),
            config.max_connections
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates missing tables and seeds the built-in languages
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        // Multi-statement text goes through the simple query protocol
        self.pool.execute(SCHEMA).await?;

        let mut seeded = 0;
        for language in Language::defaults() {
            let result = sqlx::query(
                "INSERT INTO languages (id, name, code, flag, is_active) VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(language.id)
            .bind(&language.name)
            .bind(&language.code)
            .bind(&language.flag)
            .bind(language.is_active)
            .execute(&self.pool)
            .await?;
            seeded += result.rows_affected();
        }
        if seeded > 0 {
            info!("Seeded {} default language(s)", seeded);
        }
        Ok(())
    }
}
