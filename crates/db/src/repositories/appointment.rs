use std::str::FromStr;

use sqlx::Row;

use lexbook_core::domain::booking::{AppointmentRecord, BookingId};
use lexbook_core::domain::client::{ClientInfo, ClientInfoInput};
use lexbook_core::domain::lawyer::LawyerId;
use lexbook_core::domain::practice::UnknownVariant;

use super::{
    format_datetime, parse_datetime, parse_timestamp, AppointmentRepository, RepositoryError,
};
use crate::DbPool;

pub struct SqlAppointmentRepository {
    pool: DbPool,
}

impl SqlAppointmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_member<T>(field: &str, value: &str) -> Result<T, RepositoryError>
where
    T: FromStr<Err = UnknownVariant>,
{
    value.parse::<T>().map_err(|e| RepositoryError::Decode(format!("{field}: {e}")))
}

fn row_to_appointment(row: &sqlx::sqlite::SqliteRow) -> Result<AppointmentRecord, RepositoryError> {
    let get_str = |column: &str| -> Result<String, RepositoryError> {
        row.try_get(column).map_err(|e| RepositoryError::Decode(e.to_string()))
    };
    let get_opt = |column: &str| -> Result<Option<String>, RepositoryError> {
        row.try_get(column).map_err(|e| RepositoryError::Decode(e.to_string()))
    };

    let id = get_str("id")?;
    let client = ClientInfo::try_from(ClientInfoInput {
        name: get_str("client_name")?,
        email: get_str("client_email")?,
        phone: get_str("client_phone")?,
        company: get_opt("client_company")?,
    })
    .map_err(|e| RepositoryError::Decode(format!("client of `{id}`: {e}")))?;

    let duration: i64 =
        row.try_get("duration_minutes").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let duration_minutes = u32::try_from(duration)
        .map_err(|_| RepositoryError::Decode(format!("duration_minutes `{duration}` of `{id}`")))?;

    Ok(AppointmentRecord {
        client,
        lawyer_id: LawyerId(get_str("lawyer_id")?),
        appointment_datetime: parse_datetime(
            "appointment_datetime",
            &get_str("appointment_datetime")?,
        )?,
        duration_minutes,
        practice_area: decode_member("practice_area", &get_str("practice_area")?)?,
        appointment_type: decode_member("appointment_type", &get_str("appointment_type")?)?,
        urgency: decode_member("urgency_level", &get_str("urgency_level")?)?,
        case_description: get_opt("case_description")?,
        meeting_link: get_opt("meeting_link")?,
        office_location: get_opt("office_location")?,
        created_at: parse_timestamp("created_at", &get_str("created_at")?)?,
        id: BookingId(id),
    })
}

#[async_trait::async_trait]
impl AppointmentRepository for SqlAppointmentRepository {
    async fn insert(&self, record: &AppointmentRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO appointments (id, client_name, client_email, client_phone, client_company,
                                       lawyer_id, appointment_datetime, duration_minutes,
                                       practice_area, appointment_type, urgency_level,
                                       case_description, meeting_link, office_location,
                                       created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.as_str())
        .bind(record.client.name())
        .bind(record.client.email())
        .bind(record.client.phone())
        .bind(record.client.company())
        .bind(record.lawyer_id.as_str())
        .bind(format_datetime(record.appointment_datetime))
        .bind(i64::from(record.duration_minutes))
        .bind(record.practice_area.as_str())
        .bind(record.appointment_type.as_str())
        .bind(record.urgency.as_str())
        .bind(record.case_description.as_deref())
        .bind(record.meeting_link.as_deref())
        .bind(record.office_location.as_deref())
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Conflict(record.id.as_str().to_owned())
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &BookingId,
    ) -> Result<Option<AppointmentRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, client_name, client_email, client_phone, client_company, lawyer_id,
                    appointment_datetime, duration_minutes, practice_area, appointment_type,
                    urgency_level, case_description, meeting_link, office_location, created_at
             FROM appointments WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_appointment(r)?)),
            None => Ok(None),
        }
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM appointments").fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn max_booking_sequence(&self, day_prefix: &str) -> Result<u32, RepositoryError> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM appointments WHERE SUBSTR(id, 1, ?) = ?")
                .bind(day_prefix.len() as i64)
                .bind(day_prefix)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids
            .into_iter()
            .filter_map(|id| BookingId(id).sequence())
            .max()
            .unwrap_or(0))
    }
}
