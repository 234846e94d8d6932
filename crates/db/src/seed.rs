use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use lexbook_core::domain::lawyer::LawyerId;

use crate::repositories::{LawyerRecord, LawyerRepository, RepositoryError};

/// The firm's lawyers. Practice areas are stored exactly as listed, including tokens that are
/// appointment types rather than practice areas.
pub const SEED_LAWYERS: &[SeedLawyer] = &[
    SeedLawyer {
        id: "lawyer_1",
        name: "Sarah Johnson",
        practice_areas: "corporate,contract_review",
        hourly_rate_dollars: 450,
        email: "sarah@leaptra.com",
    },
    SeedLawyer {
        id: "lawyer_2",
        name: "Michael Chen",
        practice_areas: "litigation,criminal",
        hourly_rate_dollars: 400,
        email: "michael@leaptra.com",
    },
    SeedLawyer {
        id: "lawyer_3",
        name: "Emily Rodriguez",
        practice_areas: "family,immigration",
        hourly_rate_dollars: 350,
        email: "emily@leaptra.com",
    },
    SeedLawyer {
        id: "lawyer_4",
        name: "David Kim",
        practice_areas: "real_estate,intellectual_property",
        hourly_rate_dollars: 425,
        email: "david@leaptra.com",
    },
    SeedLawyer {
        id: "lawyer_5",
        name: "Jennifer Wu",
        practice_areas: "employment,intellectual_property",
        hourly_rate_dollars: 375,
        email: "jennifer@leaptra.com",
    },
];

#[derive(Clone, Copy, Debug)]
pub struct SeedLawyer {
    pub id: &'static str,
    pub name: &'static str,
    pub practice_areas: &'static str,
    pub hourly_rate_dollars: i64,
    pub email: &'static str,
}

impl SeedLawyer {
    pub fn record(&self) -> LawyerRecord {
        LawyerRecord {
            id: LawyerId(self.id.to_owned()),
            name: self.name.to_owned(),
            practice_areas: self.practice_areas.to_owned(),
            hourly_rate: Decimal::new(self.hourly_rate_dollars, 0),
            email: self.email.to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub lawyers_added: usize,
}

/// Inserts every seed lawyer that is not already present. Existing rows are left untouched.
pub async fn seed_lawyers<R>(repository: &R) -> Result<SeedResult, RepositoryError>
where
    R: LawyerRepository + ?Sized,
{
    let mut lawyers_added = 0;
    for seed in SEED_LAWYERS {
        if repository.insert_if_absent(&seed.record()).await? {
            info!(
                event_name = "db.seed.lawyer_added",
                lawyer_id = seed.id,
                practice_areas = seed.practice_areas,
                "seed lawyer added"
            );
            lawyers_added += 1;
        }
    }
    Ok(SeedResult { lawyers_added })
}
