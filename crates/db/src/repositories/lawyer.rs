use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::Row;

use lexbook_core::domain::lawyer::{Lawyer, LawyerId};
use lexbook_core::domain::practice::PracticeArea;

use super::{LawyerRecord, LawyerRepository, RepositoryError};
use crate::DbPool;

pub struct SqlLawyerRepository {
    pool: DbPool,
}

impl SqlLawyerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<LawyerRecord, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let practice_areas: String =
        row.try_get("practice_areas").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let hourly_rate: f64 =
        row.try_get("hourly_rate").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let email: String = row.try_get("email").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let hourly_rate = Decimal::try_from(hourly_rate)
        .map_err(|e| RepositoryError::Decode(format!("hourly_rate for `{id}`: {e}")))?
        .round_dp(2);

    Ok(LawyerRecord { id: LawyerId(id), name, practice_areas, hourly_rate, email })
}

#[async_trait::async_trait]
impl LawyerRepository for SqlLawyerRepository {
    async fn insert_if_absent(&self, record: &LawyerRecord) -> Result<bool, RepositoryError> {
        let hourly_rate = record.hourly_rate.to_f64().ok_or_else(|| {
            RepositoryError::Decode(format!("hourly_rate for `{}` is not representable", record.id))
        })?;

        let result = sqlx::query(
            "INSERT OR IGNORE INTO lawyers (id, name, practice_areas, hourly_rate, email)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.id.as_str())
        .bind(&record.name)
        .bind(&record.practice_areas)
        .bind(hourly_rate)
        .bind(&record.email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_by_id(&self, id: &LawyerId) -> Result<Option<Lawyer>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, practice_areas, hourly_rate, email FROM lawyers WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_record(r)?.into_lawyer())),
            None => Ok(None),
        }
    }

    async fn find_by_practice_area(
        &self,
        area: PracticeArea,
    ) -> Result<Vec<Lawyer>, RepositoryError> {
        // Wrapping both sides in commas turns a substring test into a whole-token test.
        let rows = sqlx::query(
            "SELECT id, name, practice_areas, hourly_rate, email
             FROM lawyers
             WHERE INSTR(',' || REPLACE(practice_areas, ' ', '') || ',', ',' || ? || ',') > 0
             ORDER BY id",
        )
        .bind(area.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| row_to_record(row).map(LawyerRecord::into_lawyer)).collect()
    }

    async fn list(&self) -> Result<Vec<LawyerRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, practice_areas, hourly_rate, email FROM lawyers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }
}
