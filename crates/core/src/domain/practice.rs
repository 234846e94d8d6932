use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("`{value}` is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set of snake_case string values with lossless string round-trips.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Comma-separated list of accepted values, for error messages.
            pub fn allowed_values() -> String {
                Self::ALL.iter().map(|value| value.as_str()).collect::<Vec<_>>().join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }
    };
}

string_enum!(
    /// Legal specialization a lawyer practices and an inquiry is routed to.
    PracticeArea, "practice area", {
        Corporate => "corporate",
        Litigation => "litigation",
        Family => "family",
        RealEstate => "real_estate",
        Criminal => "criminal",
        Immigration => "immigration",
        IntellectualProperty => "intellectual_property",
        Employment => "employment",
    }
);

string_enum!(AppointmentType, "appointment type", {
    Consultation => "consultation",
    FollowUp => "follow_up",
    DocumentReview => "document_review",
    CourtPreparation => "court_preparation",
    ContractReview => "contract_review",
});

string_enum!(UrgencyLevel, "urgency level", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Urgent => "urgent",
});

impl Default for AppointmentType {
    fn default() -> Self {
        Self::Consultation
    }
}

#[cfg(test)]
mod tests {
    use super::{AppointmentType, PracticeArea, UnknownVariant, UrgencyLevel};

    #[test]
    fn every_member_round_trips_through_its_string_form() {
        for area in PracticeArea::ALL {
            assert_eq!(area.as_str().parse::<PracticeArea>(), Ok(*area));
        }
        for kind in AppointmentType::ALL {
            assert_eq!(kind.as_str().parse::<AppointmentType>(), Ok(*kind));
        }
        for level in UrgencyLevel::ALL {
            assert_eq!(level.as_str().parse::<UrgencyLevel>(), Ok(*level));
        }
    }

    #[test]
    fn unknown_values_are_rejected_with_kind() {
        let error = "tax".parse::<PracticeArea>().expect_err("tax is not a practice area");
        assert_eq!(error, UnknownVariant { kind: "practice area", value: "tax".to_string() });
    }

    #[test]
    fn serde_uses_snake_case_wire_names() {
        let json = serde_json::to_string(&AppointmentType::CourtPreparation).expect("serialize");
        assert_eq!(json, "\"court_preparation\"");

        let area: PracticeArea =
            serde_json::from_str("\"intellectual_property\"").expect("deserialize");
        assert_eq!(area, PracticeArea::IntellectualProperty);
    }

    #[test]
    fn allowed_values_lists_all_members() {
        assert_eq!(UrgencyLevel::allowed_values(), "low, medium, high, urgent");
        assert_eq!(PracticeArea::ALL.len(), 8);
        assert_eq!(AppointmentType::ALL.len(), 5);
    }
}
