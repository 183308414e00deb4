use std::sync::Arc;

use async_trait::async_trait;
use folio_storage::{Storage, StorageResult};
use sqlx_postgres::PgPool;
use tracing::info;

use crate::config::PostgresConfig;
use crate::error::{PostgresError, Result};
use crate::{migrations, pool};

/// PostgreSQL implementation of every folio storage trait.
///
/// The per-entity trait impls live in `user.rs`, `profile.rs`, `project.rs`
/// and `audit.rs`.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    /// Connects, and runs migrations when the config asks for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or a migration fails.
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let pool = pool::create_pool(config).await?;
        if config.run_migrations {
            migrations::run(&pool).await?;
        }
        info!("PostgreSQL storage ready");
        Ok(Self::from_pool(pool))
    }

    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> StorageResult<()> {
        pool::test_connection(&self.pool).await?;
        Ok(())
    }
}

/// Decodes a text column into a domain enum.
pub(crate) fn parse_column<T>(value: &str) -> std::result::Result<T, PostgresError>
where
    T: std::str::FromStr<Err = String>,
{
    value.parse().map_err(PostgresError::Decode)
}
