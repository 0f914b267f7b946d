use std::sync::Arc;

use axum::Router;
use roster_core::config::{AppConfig, StorageBackend};
use roster_db::{
    connection::connect_to, migrations, DbPool, InMemoryCustomerRepository, SqlCustomerRepository,
};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::customers;
use crate::health::{self, StoreProbe};
use crate::service::{CustomerService, RepositoryCustomerService};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: Option<DbPool>,
    pub customers: Arc<dyn CustomerService>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

impl Application {
    /// Customer endpoints plus `/health`, wrapped in request tracing.
    pub fn router(&self) -> Router {
        let store = match &self.db_pool {
            Some(pool) => StoreProbe::Sqlite(pool.clone()),
            None => StoreProbe::Memory,
        };

        customers::router(self.customers.clone())
            .merge(health::router(store))
            .layer(TraceLayer::new_for_http())
    }
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        backend = ?config.database.backend,
        "starting application bootstrap"
    );

    if config.database.backend == StorageBackend::Memory {
        info!(
            event_name = "system.bootstrap.memory_store",
            correlation_id = "bootstrap",
            "using process-local customer store; data is lost on exit"
        );
        let service = RepositoryCustomerService::new(InMemoryCustomerRepository::default());
        return Ok(Application { config, db_pool: None, customers: Arc::new(service) });
    }

    let db_pool = connect_to(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let service = RepositoryCustomerService::new(SqlCustomerRepository::new(db_pool.clone()));
    Ok(Application { config, db_pool: Some(db_pool), customers: Arc::new(service) })
}
