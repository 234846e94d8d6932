use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::practice::PracticeArea;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LawyerId(pub String);

impl LawyerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LawyerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lawyer {
    pub id: LawyerId,
    pub name: String,
    pub practice_areas: Vec<PracticeArea>,
    pub hourly_rate: Decimal,
    pub email: String,
}

impl Lawyer {
    pub fn practices(&self, area: PracticeArea) -> bool {
        self.practice_areas.contains(&area)
    }
}
