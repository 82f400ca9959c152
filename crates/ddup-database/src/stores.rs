//! Driver selection.

use std::sync::Arc;

use tracing::info;

use ddup_core::config::{DatabaseConfig, DatabaseDriver};
use ddup_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::postgres::{PgOrganizationStore, PgSessionStore, PgUserStore};
use crate::store::{OrganizationStore, SessionStore, UserStore};

/// The three stores backing the identity core, built once at startup.
#[derive(Debug, Clone)]
pub struct Stores {
    /// User persistence.
    pub users: Arc<dyn UserStore>,
    /// Session ledger persistence.
    pub sessions: Arc<dyn SessionStore>,
    /// Organization and membership persistence.
    pub organizations: Arc<dyn OrganizationStore>,
    /// The pool, when running on PostgreSQL.
    pub pool: Option<DatabasePool>,
}

impl Stores {
    /// Build the stores for the configured driver.
    ///
    /// For PostgreSQL this connects and runs pending migrations.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        match config.driver {
            DatabaseDriver::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                run_migrations(pool.pool()).await?;
                Ok(Self::postgres(pool))
            }
            DatabaseDriver::Memory => {
                info!("Using in-memory storage; data is lost on restart");
                Ok(Self::memory())
            }
        }
    }

    /// Stores backed by an existing PostgreSQL pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            users: Arc::new(PgUserStore::new(pg.clone())),
            sessions: Arc::new(PgSessionStore::new(pg.clone())),
            organizations: Arc::new(PgOrganizationStore::new(pg)),
            pool: Some(pool),
        }
    }

    /// Stores sharing one fresh in-memory database.
    pub fn memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            sessions: Arc::new(store.clone()),
            organizations: Arc::new(store),
            pool: None,
        }
    }

    /// Reachability check used by readiness and the liveness probe.
    pub async fn ping(&self) -> AppResult<()> {
        self.sessions.ping().await
    }

    /// Release pooled connections.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
