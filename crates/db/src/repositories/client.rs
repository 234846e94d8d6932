use chrono::{DateTime, Utc};
use uuid::Uuid;

use lexbook_core::domain::client::ClientInfo;

use super::{ClientRepository, RepositoryError};
use crate::DbPool;

pub struct SqlClientRepository {
    pool: DbPool,
}

impl SqlClientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ClientRepository for SqlClientRepository {
    async fn upsert(
        &self,
        client: &ClientInfo,
        seen_at: DateTime<Utc>,
    ) -> Result<String, RepositoryError> {
        let id: String = sqlx::query_scalar(
            "INSERT INTO clients (id, name, email, phone, company, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(email) DO UPDATE SET
                 name = excluded.name,
                 phone = excluded.phone,
                 company = COALESCE(excluded.company, clients.company)
             RETURNING id",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(client.name())
        .bind(client.email())
        .bind(client.phone())
        .bind(client.company())
        .bind(seen_at.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM clients").fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }
}
