//! Booking agent runtime: LLM intake, availability lookup and confirmation.
//!
//! # Architecture
//!
//! Each request walks the booking flow defined in `lexbook_core::flows`:
//! 1. **Intake** (`intake`) - free text to a classification via a forced function call
//! 2. **Availability** (`scheduling`, `calendar`) - matching lawyers and their open slots
//! 3. **Confirmation** (`confirmation`, `communication`) - booking id, notes, persistence, email
//!
//! `runtime::BookingRuntime` sequences the stages and turns every failure after input
//! validation into a structured `outcome::BookingOutcome`.
//!
//! The LLM only classifies and writes prose. Lawyer matching, slot generation, booking ids
//! and locations are deterministic.

pub mod calendar;
pub mod communication;
pub mod confirmation;
pub mod intake;
pub mod llm;
pub mod outcome;
pub mod prompts;
pub mod runtime;
pub mod scheduling;

pub use confirmation::{ConfirmationRequest, ConfirmationRequestInput};
pub use outcome::{BookingOutcome, ErrorClass, LawyerOption};
pub use runtime::{BookingRuntime, InquiryRequest, InquiryRequestInput, RuntimeParts};
