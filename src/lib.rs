//! Bookshelf application library
//!
//! Owns the books module and the process-level composition: settings, the
//! connection pool, the module registry, and the HTTP server.

pub mod modules;

use anyhow::Context;
use axum::Router;
use bookshelf_db::Database;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Fully wired application, ready to serve.
pub struct Application {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl Application {
    /// Connect and ping the pool, register modules, apply their schema, and initialize them.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::connect(&settings.database)
            .await
            .context("failed to open database pool")?;
        db.ping().await?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);

        db.apply_schema(&registry.collect_schema())
            .await
            .context("failed to apply module schema")?;

        let ctx = InitCtx {
            settings: &settings,
        };
        registry.init_modules(&ctx).await?;

        tracing::info!(
            modules = registry.module_count(),
            "bookshelf bootstrap complete"
        );

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    /// Router with every module mounted and the standard middleware stack
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    /// Start modules and serve HTTP until a shutdown signal arrives
    pub async fn serve(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.start_modules(&ctx).await?;

        let served = bookshelf_http::start_server(
            &self.registry,
            &self.settings,
            bookshelf_http::shutdown_signal(),
        )
        .await;

        self.registry.stop_modules().await?;
        self.db.close().await;

        served
    }
}

/// Apply the schema of every module and exit
pub async fn init_db(settings: &Settings) -> anyhow::Result<()> {
    let db = Database::connect(&settings.database)
        .await
        .context("failed to open database pool")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &db);

    let statements = registry.collect_schema();
    db.apply_schema(&statements)
        .await
        .context("failed to apply module schema")?;
    db.close().await;

    tracing::info!(statements = statements.len(), "database schema applied");
    Ok(())
}
