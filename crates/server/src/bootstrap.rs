use std::sync::Arc;

use lexbook_agent::runtime::RuntimeBuildError;
use lexbook_agent::BookingRuntime;
use lexbook_core::config::{AppConfig, ConfigError};
use lexbook_db::{connect_with_config, initialize, AdminError, DbPool};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runtime: Arc<BookingRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database initialization failed: {0}")]
    Initialize(#[source] AdminError),
    #[error("booking runtime could not be built: {0}")]
    Runtime(#[from] RuntimeBuildError),
}

/// Connects and initializes the store and builds the runtime from an already loaded config.
/// Loading stays with the caller so logging can be configured first.
pub async fn bootstrap(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        llm_provider = config.llm.provider.as_str(),
        availability_provider = config.availability.provider.as_str(),
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    let report = initialize(&db_pool).await.map_err(BootstrapError::Initialize)?;
    info!(
        event_name = "system.bootstrap.database_initialized",
        correlation_id = "bootstrap",
        lawyers_added = report.lawyers_added,
        lawyer_count = report.lawyer_count,
        appointment_count = report.appointment_count,
        "database migrations applied and lawyers seeded"
    );

    let runtime = Arc::new(BookingRuntime::from_config(&config, db_pool.clone())?);

    Ok(Application { config, db_pool, runtime })
}

#[cfg(test)]
mod tests {
    use lexbook_core::config::{AppConfig, AvailabilityProviderKind, ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap, Application, BootstrapError};

    async fn bootstrap_in_memory(overrides: ConfigOverrides) -> Result<Application, BootstrapError> {
        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                ..overrides
            },
            ..LoadOptions::default()
        })?;
        bootstrap(config).await
    }

    #[tokio::test]
    async fn bootstrap_initializes_schema_and_seed_data() {
        let app = bootstrap_in_memory(ConfigOverrides::default())
            .await
            .expect("bootstrap should succeed with defaults");

        let (lawyers,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lawyers")
            .fetch_one(&app.db_pool)
            .await
            .expect("lawyers table exists");
        assert_eq!(lawyers, 5);
        assert_eq!(app.runtime.availability_provider(), "synthetic");

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn calendar_provider_without_url_fails_fast() {
        let result = bootstrap_in_memory(ConfigOverrides {
            availability_provider: Some(AvailabilityProviderKind::Calendar),
            ..ConfigOverrides::default()
        })
        .await;

        let error = result.err().expect("calendar url is required");
        assert!(matches!(error, BootstrapError::Config(_)));
        assert!(error.to_string().contains("calendar"));
    }
}
