//! Administrative operations: schema initialization and status reporting.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::migrations;
use crate::repositories::{
    AppointmentRepository, ClientRepository, LawyerRepository, RepositoryError,
    SqlAppointmentRepository, SqlClientRepository, SqlLawyerRepository,
};
use crate::seed::seed_lawyers;
use crate::DbPool;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for AdminError {
    fn from(value: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(value))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub lawyers_added: usize,
    pub lawyer_count: u64,
    pub appointment_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LawyerSummary {
    pub id: String,
    pub name: String,
    pub practice_areas: String,
    pub hourly_rate: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub tables: Vec<String>,
    pub lawyer_count: u64,
    pub appointment_count: u64,
    pub client_count: u64,
    pub lawyers: Vec<LawyerSummary>,
}

/// Applies pending migrations and seeds missing lawyers. Safe to run repeatedly.
pub async fn initialize(pool: &DbPool) -> Result<InitReport, AdminError> {
    migrations::run_pending(pool).await?;

    let lawyers = SqlLawyerRepository::new(pool.clone());
    let seeded = seed_lawyers(&lawyers).await?;
    let lawyer_count = lawyers.list().await?.len() as u64;
    let appointment_count = SqlAppointmentRepository::new(pool.clone()).count().await?;

    info!(
        event_name = "db.initialized",
        lawyers_added = seeded.lawyers_added,
        lawyer_count,
        appointment_count,
        "database initialized"
    );

    Ok(InitReport { lawyers_added: seeded.lawyers_added, lawyer_count, appointment_count })
}

pub async fn status_report(pool: &DbPool) -> Result<StatusReport, AdminError> {
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '\\_sqlx%' ESCAPE '\\'
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let has = |name: &str| tables.iter().any(|table| table == name);

    let lawyers = if has("lawyers") {
        SqlLawyerRepository::new(pool.clone()).list().await?
    } else {
        Vec::new()
    };
    let appointment_count = if has("appointments") {
        SqlAppointmentRepository::new(pool.clone()).count().await?
    } else {
        0
    };
    let client_count =
        if has("clients") { SqlClientRepository::new(pool.clone()).count().await? } else { 0 };

    Ok(StatusReport {
        lawyer_count: lawyers.len() as u64,
        lawyers: lawyers
            .into_iter()
            .map(|record| LawyerSummary {
                id: record.id.0,
                name: record.name,
                practice_areas: record.practice_areas,
                hourly_rate: record.hourly_rate,
            })
            .collect(),
        tables,
        appointment_count,
        client_count,
    })
}
