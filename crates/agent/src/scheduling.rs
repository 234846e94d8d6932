use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use lexbook_core::{AvailabilityError, AvailabilityProvider, AvailabilitySlot, Lawyer, PracticeArea};
use lexbook_db::repositories::{LawyerRepository, RepositoryError};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::outcome::ErrorClass;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LawyerAvailability {
    pub lawyer: Lawyer,
    pub slots: Vec<AvailabilitySlot>,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Availability(#[from] AvailabilityError),
}

impl ResolveError {
    pub fn error_class(&self) -> ErrorClass {
        match self {
            Self::Repository(_) => ErrorClass::Persistence,
            Self::Availability(_) => ErrorClass::Availability,
        }
    }
}

/// Matches lawyers to a practice area and asks the provider for their open slots.
pub struct AvailabilityResolver {
    lawyers: Arc<dyn LawyerRepository>,
    provider: Arc<dyn AvailabilityProvider>,
}

impl AvailabilityResolver {
    pub fn new(lawyers: Arc<dyn LawyerRepository>, provider: Arc<dyn AvailabilityProvider>) -> Self {
        Self { lawyers, provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Lawyers practicing `practice_area` with at least one slot on `dates`, in id order.
    pub async fn find_available_lawyers(
        &self,
        practice_area: PracticeArea,
        dates: &[NaiveDate],
        now: NaiveDateTime,
    ) -> Result<Vec<LawyerAvailability>, ResolveError> {
        let lawyers = self.lawyers.find_by_practice_area(practice_area).await?;
        let mut available = Vec::with_capacity(lawyers.len());

        for lawyer in lawyers {
            let slots = self.provider.slots_for(&lawyer, dates, now).await?;
            if slots.is_empty() {
                debug!(
                    event_name = "availability.lawyer_fully_booked",
                    lawyer_id = %lawyer.id,
                    "lawyer has no open slots in the window"
                );
                continue;
            }
            available.push(LawyerAvailability { lawyer, slots });
        }

        Ok(available)
    }

    pub async fn slots_for_lawyer(
        &self,
        lawyer: &Lawyer,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Vec<AvailabilitySlot>, ResolveError> {
        Ok(self.provider.slots_for(lawyer, &[date], now).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use lexbook_core::{
        AvailabilityError, AvailabilityProvider, AvailabilitySlot, Lawyer, PracticeArea,
        SyntheticAvailability,
    };
    use lexbook_db::repositories::memory::InMemoryLawyerRepository;
    use lexbook_db::repositories::LawyerRepository;
    use lexbook_db::seed::seed_lawyers;

    use super::{AvailabilityResolver, ResolveError};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("date")
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17).and_then(|date| date.and_hms_opt(8, 0, 0)).expect("now")
    }

    async fn seeded() -> Arc<InMemoryLawyerRepository> {
        let lawyers = Arc::new(InMemoryLawyerRepository::default());
        seed_lawyers(lawyers.as_ref()).await.expect("seed");
        lawyers
    }

    struct BookedSolid(&'static str);

    #[async_trait]
    impl AvailabilityProvider for BookedSolid {
        async fn slots_for(
            &self,
            lawyer: &Lawyer,
            dates: &[NaiveDate],
            now: NaiveDateTime,
        ) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
            if lawyer.id.as_str() == self.0 {
                Ok(Vec::new())
            } else {
                SyntheticAvailability.slots_for(lawyer, dates, now).await
            }
        }

        fn name(&self) -> &'static str {
            "booked-solid"
        }
    }

    struct Unreachable;

    #[async_trait]
    impl AvailabilityProvider for Unreachable {
        async fn slots_for(
            &self,
            lawyer: &Lawyer,
            _dates: &[NaiveDate],
            _now: NaiveDateTime,
        ) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
            Err(AvailabilityError::Transport {
                lawyer_id: lawyer.id.to_string(),
                message: "connection refused".to_owned(),
            })
        }

        fn name(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn intellectual_property_matches_two_lawyers() {
        let lawyers: Arc<dyn LawyerRepository> = seeded().await;
        let resolver = AvailabilityResolver::new(lawyers, Arc::new(SyntheticAvailability));

        let available = resolver
            .find_available_lawyers(PracticeArea::IntellectualProperty, &[monday()], now())
            .await
            .expect("resolve");

        let ids = available.iter().map(|entry| entry.lawyer.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["lawyer_4", "lawyer_5"]);
        assert!(available.iter().all(|entry| entry.slots.len() == 6));
    }

    #[tokio::test]
    async fn unmatched_practice_area_is_empty() {
        let lawyers: Arc<dyn LawyerRepository> = Arc::new(InMemoryLawyerRepository::default());
        let resolver = AvailabilityResolver::new(lawyers, Arc::new(SyntheticAvailability));

        let available = resolver
            .find_available_lawyers(PracticeArea::Employment, &[monday()], now())
            .await
            .expect("resolve");

        assert!(available.is_empty());
    }

    #[tokio::test]
    async fn fully_booked_lawyers_are_omitted() {
        let lawyers: Arc<dyn LawyerRepository> = seeded().await;
        let resolver = AvailabilityResolver::new(lawyers, Arc::new(BookedSolid("lawyer_4")));

        let available = resolver
            .find_available_lawyers(PracticeArea::IntellectualProperty, &[monday()], now())
            .await
            .expect("resolve");

        assert_eq!(available.len(), 1);
        assert_eq!(available[0].lawyer.id.as_str(), "lawyer_5");
    }

    #[tokio::test]
    async fn provider_failure_surfaces() {
        let lawyers: Arc<dyn LawyerRepository> = seeded().await;
        let resolver = AvailabilityResolver::new(lawyers, Arc::new(Unreachable));

        let error = resolver
            .find_available_lawyers(PracticeArea::Family, &[monday()], now())
            .await
            .expect_err("provider down");

        assert!(matches!(error, ResolveError::Availability(AvailabilityError::Transport { .. })));
    }
}
