//! Connection pool factory for the relational store.
//!
//! The pool is built once by the process and handed to whoever needs it.
//! Both SQLite and PostgreSQL are reachable through sqlx's `Any` driver; the
//! URL scheme decides which one is used and which DDL variant is applied.

use std::time::Duration;

use anyhow::{bail, Context};
use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::SchemaStatement;
use sqlx::any::{install_default_drivers, AnyPoolOptions};
use sqlx::AnyPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    pub fn from_url(url: &str) -> anyhow::Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme {
            "sqlite" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            other => bail!(
                "unsupported database scheme '{}'; expected sqlite or postgres",
                other
            ),
        }
    }

    /// Pick the DDL variant for this dialect
    pub fn ddl<'a>(&self, statement: &'a SchemaStatement) -> &'a str {
        match self {
            Dialect::Sqlite => statement.sqlite,
            Dialect::Postgres => statement.postgres,
        }
    }
}

/// Shared handle to the connection pool
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    dialect: Dialect,
}

impl Database {
    /// Open a pool according to `settings`
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let dialect = Dialect::from_url(&settings.url)?;
        install_default_drivers();

        let mut options = AnyPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms));

        if dialect == Dialect::Sqlite && settings.url.contains(":memory:") {
            // Every in-memory connection is its own database; keep exactly one alive.
            options = options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = options
            .connect(&settings.url)
            .await
            .with_context(|| format!("failed to connect to {:?} database", dialect))?;

        tracing::info!(target: "bookshelf-db", ?dialect, "database pool ready");

        Ok(Self { pool, dialect })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Execute module schema statements in order
    pub async fn apply_schema(&self, statements: &[(String, SchemaStatement)]) -> anyhow::Result<()> {
        for (module, statement) in statements {
            tracing::info!(
                target: "bookshelf-db",
                module = %module,
                statement = statement.id,
                "applying schema statement"
            );

            sqlx::query(self.dialect.ddl(statement))
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!(
                        "failed to apply schema statement '{}' for module '{}'",
                        statement.id, module
                    )
                })?;
        }

        Ok(())
    }

    /// Round-trip a trivial query to check the store is reachable
    pub async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database ping failed")?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "bookshelf-db", "database pool closed");
    }
}
