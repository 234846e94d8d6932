use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use lexbook_core::domain::booking::{AppointmentRecord, BookingId};
use lexbook_core::domain::client::ClientInfo;
use lexbook_core::domain::lawyer::{Lawyer, LawyerId};
use lexbook_core::domain::practice::PracticeArea;

use super::{
    AppointmentRepository, ClientRepository, LawyerRecord, LawyerRepository, RepositoryError,
};

#[derive(Default)]
pub struct InMemoryLawyerRepository {
    lawyers: RwLock<BTreeMap<String, LawyerRecord>>,
}

#[async_trait::async_trait]
impl LawyerRepository for InMemoryLawyerRepository {
    async fn insert_if_absent(&self, record: &LawyerRecord) -> Result<bool, RepositoryError> {
        let mut lawyers = self.lawyers.write().await;
        if lawyers.contains_key(record.id.as_str()) {
            return Ok(false);
        }
        lawyers.insert(record.id.0.clone(), record.clone());
        Ok(true)
    }

    async fn find_by_id(&self, id: &LawyerId) -> Result<Option<Lawyer>, RepositoryError> {
        let lawyers = self.lawyers.read().await;
        Ok(lawyers.get(&id.0).cloned().map(LawyerRecord::into_lawyer))
    }

    async fn find_by_practice_area(
        &self,
        area: PracticeArea,
    ) -> Result<Vec<Lawyer>, RepositoryError> {
        let lawyers = self.lawyers.read().await;
        Ok(lawyers
            .values()
            .filter(|record| record.has_practice_token(area))
            .cloned()
            .map(LawyerRecord::into_lawyer)
            .collect())
    }

    async fn list(&self) -> Result<Vec<LawyerRecord>, RepositoryError> {
        let lawyers = self.lawyers.read().await;
        Ok(lawyers.values().cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    appointments: RwLock<HashMap<String, AppointmentRecord>>,
}

impl InMemoryAppointmentRepository {
    pub async fn all(&self) -> Vec<AppointmentRecord> {
        let appointments = self.appointments.read().await;
        let mut records = appointments.values().cloned().collect::<Vec<_>>();
        records.sort_by(|left, right| left.id.0.cmp(&right.id.0));
        records
    }
}

#[async_trait::async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn insert(&self, record: &AppointmentRecord) -> Result<(), RepositoryError> {
        let mut appointments = self.appointments.write().await;
        if appointments.contains_key(record.id.as_str()) {
            return Err(RepositoryError::Conflict(record.id.0.clone()));
        }
        appointments.insert(record.id.0.clone(), record.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &BookingId,
    ) -> Result<Option<AppointmentRecord>, RepositoryError> {
        let appointments = self.appointments.read().await;
        Ok(appointments.get(&id.0).cloned())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.appointments.read().await.len() as u64)
    }

    async fn max_booking_sequence(&self, day_prefix: &str) -> Result<u32, RepositoryError> {
        let appointments = self.appointments.read().await;
        Ok(appointments
            .values()
            .filter(|record| record.id.as_str().starts_with(day_prefix))
            .filter_map(|record| record.id.sequence())
            .max()
            .unwrap_or(0))
    }
}

#[derive(Default)]
pub struct InMemoryClientRepository {
    clients: RwLock<HashMap<String, (String, ClientInfo)>>,
}

#[async_trait::async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn upsert(
        &self,
        client: &ClientInfo,
        _seen_at: DateTime<Utc>,
    ) -> Result<String, RepositoryError> {
        let mut clients = self.clients.write().await;
        let entry = clients
            .entry(client.email().to_owned())
            .or_insert_with(|| (Uuid::new_v4().to_string(), client.clone()));
        entry.1 = client.clone();
        Ok(entry.0.clone())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.clients.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use lexbook_core::domain::booking::{AppointmentRecord, BookingId};
    use lexbook_core::domain::client::{ClientInfo, ClientInfoInput};
    use lexbook_core::domain::lawyer::LawyerId;
    use lexbook_core::domain::practice::{AppointmentType, PracticeArea, UrgencyLevel};

    use crate::repositories::{
        AppointmentRepository, ClientRepository, InMemoryAppointmentRepository,
        InMemoryClientRepository, InMemoryLawyerRepository, LawyerRecord, LawyerRepository,
        RepositoryError,
    };

    fn client() -> ClientInfo {
        ClientInfo::try_from(ClientInfoInput {
            name: "John Smith".to_string(),
            email: "john@example.com".to_string(),
            phone: "555-123-4567".to_string(),
            company: None,
        })
        .expect("valid client")
    }

    fn appointment(id: &str) -> AppointmentRecord {
        AppointmentRecord {
            id: BookingId(id.to_string()),
            client: client(),
            lawyer_id: LawyerId("lawyer_3".to_string()),
            appointment_datetime: NaiveDate::from_ymd_opt(2026, 10, 19)
                .and_then(|date| date.and_hms_opt(9, 0, 0))
                .expect("valid datetime"),
            duration_minutes: 60,
            practice_area: PracticeArea::Family,
            appointment_type: AppointmentType::Consultation,
            urgency: UrgencyLevel::Medium,
            case_description: Some("Custody arrangement review".to_string()),
            meeting_link: None,
            office_location: Some("Leaptra Law Offices".to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn in_memory_lawyer_insert_is_idempotent() {
        let repo = InMemoryLawyerRepository::default();
        let record = LawyerRecord {
            id: LawyerId("lawyer_3".to_string()),
            name: "Emily Rodriguez".to_string(),
            practice_areas: "family,immigration".to_string(),
            hourly_rate: Decimal::new(350, 0),
            email: "emily@leaptra.com".to_string(),
        };

        assert!(repo.insert_if_absent(&record).await.expect("first insert"));
        assert!(!repo.insert_if_absent(&record).await.expect("second insert"));

        let family = repo.find_by_practice_area(PracticeArea::Family).await.expect("lookup");
        assert_eq!(family.len(), 1);
        assert!(repo
            .find_by_practice_area(PracticeArea::Criminal)
            .await
            .expect("lookup")
            .is_empty());
    }

    #[tokio::test]
    async fn in_memory_appointment_rejects_duplicate_ids() {
        let repo = InMemoryAppointmentRepository::default();
        repo.insert(&appointment("LEG-20261019-0001")).await.expect("insert");
        repo.insert(&appointment("LEG-20261019-0004")).await.expect("insert");
        repo.insert(&appointment("LEG-20261020-0009")).await.expect("insert");

        let error = repo
            .insert(&appointment("LEG-20261019-0001"))
            .await
            .expect_err("duplicate primary key");
        assert!(matches!(error, RepositoryError::Conflict(_)));

        assert_eq!(repo.count().await.expect("count"), 3);
        assert_eq!(repo.max_booking_sequence("LEG-20261019-").await.expect("max"), 4);
        assert_eq!(repo.max_booking_sequence("LEG-20261021-").await.expect("max"), 0);
    }

    #[tokio::test]
    async fn in_memory_client_upsert_keys_by_email() {
        let repo = InMemoryClientRepository::default();
        let first = repo.upsert(&client(), Utc::now()).await.expect("upsert");
        let second = repo.upsert(&client(), Utc::now()).await.expect("upsert");

        assert_eq!(first, second);
        assert_eq!(repo.count().await.expect("count"), 1);
    }
}
