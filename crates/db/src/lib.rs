//! SQLite store adapter for bookshelf.
//!
//! [`Database`] owns the connection pool for the lifetime of the process and is
//! handed to modules through the kernel's init context. It carries no business
//! logic: modules issue their own parameterized queries against [`Database::pool`].

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

const LEDGER_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS _bookshelf_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Connection parameters for the pool.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Shared handle to the relational store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool against the configured database URL.
    pub async fn connect(config: &DbConfig) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .with_context(|| format!("invalid database url '{}'", config.url))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to connect to '{}'", config.url))?;

        tracing::info!(
            target: "bookshelf-db",
            url = %config.url,
            max_connections = config.max_connections,
            "database pool opened"
        );

        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// The pool is pinned to a single connection that never expires, since every
    /// new SQLite memory connection would otherwise see an empty database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("invalid in-memory database url")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open in-memory database")?;

        Ok(Self { pool })
    }

    /// Underlying pool, for issuing queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query to confirm the store is reachable.
    pub async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database ping failed")?;
        Ok(())
    }

    /// Apply `sql` once for `(module, id)`.
    ///
    /// Returns `false` when the ledger already records the migration.
    pub async fn apply_migration(&self, module: &str, id: &str, sql: &str) -> anyhow::Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to open migration transaction")?;

        sqlx::raw_sql(LEDGER_TABLE_SQL)
            .execute(&mut *tx)
            .await
            .context("failed to create migration ledger")?;

        let applied: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM _bookshelf_migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .context("failed to read migration ledger")?;

        if applied.is_some() {
            tracing::debug!(target: "bookshelf-db", module, migration = id, "migration already applied");
            return Ok(false);
        }

        sqlx::raw_sql(sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration '{module}/{id}' failed"))?;

        sqlx::query("INSERT INTO _bookshelf_migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("failed to record migration")?;

        tx.commit().await.context("failed to commit migration")?;

        tracing::info!(target: "bookshelf-db", module, migration = id, "migration applied");
        Ok(true)
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "bookshelf-db", "database pool closed");
    }
}
