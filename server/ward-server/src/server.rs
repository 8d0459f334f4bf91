use crate::config::WardConfig;
use anyhow::{Context, Result};
use billing_service::{BillingService, InMemoryWardRepository, PostgresWardRepository, WardRepository};
use database_layer::DatabasePool;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared state handed to every handler
#[derive(Clone, Debug)]
pub struct WardServer {
    pub config: WardConfig,
    pub billing: Arc<BillingService>,
    /// `None` when running on the in-memory repository
    pub db_pool: Option<DatabasePool>,
}

impl WardServer {
    /// Connect to PostgreSQL, apply migrations when enabled, and build the state
    pub async fn new(config: WardConfig) -> Result<Self> {
        let url = config.database.connection_url();
        let pool = DatabasePool::new(&url, &config.database.pool)
            .await
            .context("Failed to connect to PostgreSQL")?;

        if config.database.run_migrations {
            pool.run_migrations()
                .await
                .context("Failed to apply database migrations")?;
        } else {
            warn!("Skipping database migrations");
        }

        Self::new_with_pool(pool, config)
    }

    /// Build the state over an existing pool
    pub fn new_with_pool(pool: DatabasePool, config: WardConfig) -> Result<Self> {
        let repo: Arc<dyn WardRepository> = Arc::new(PostgresWardRepository::new(pool.clone()));
        let billing = BillingService::new(repo).context("Failed to initialize billing service")?;

        Ok(Self {
            config,
            billing: Arc::new(billing),
            db_pool: Some(pool),
        })
    }

    /// Build the state over the in-memory repository (local development and tests)
    pub fn in_memory(config: WardConfig) -> Result<Self> {
        info!("Using in-memory ward repository; data is lost on exit");
        let repo: Arc<dyn WardRepository> = Arc::new(InMemoryWardRepository::new());
        let billing = BillingService::new(repo).context("Failed to initialize billing service")?;

        Ok(Self {
            config,
            billing: Arc::new(billing),
            db_pool: None,
        })
    }
}
