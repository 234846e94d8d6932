pub mod availability;
pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod validation;

pub use availability::{
    AvailabilityError, AvailabilityProvider, BusyInterval, SyntheticAvailability,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::appointment::{AppointmentRequest, AppointmentRequestInput};
pub use domain::booking::{AppointmentRecord, BookingConfirmation, BookingId};
pub use domain::classification::{Classification, RawClassification};
pub use domain::client::{ClientInfo, ClientInfoInput};
pub use domain::lawyer::{Lawyer, LawyerId};
pub use domain::practice::{AppointmentType, PracticeArea, UrgencyLevel};
pub use domain::slot::{AvailabilitySlot, LocationMode, SlotSelection};
pub use errors::DomainError;
pub use validation::{ValidationError, ValidationErrorKind};
