use thiserror::Error;

use crate::flows::FlowTransitionError;

/// Rule violations raised after input validation has passed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("booking sequence exhausted for {day_prefix}")]
    BookingSequenceExhausted { day_prefix: String },
    #[error(transparent)]
    FlowTransition(#[from] FlowTransitionError),
}

#[cfg(test)]
mod tests {
    use crate::errors::DomainError;
    use crate::flows::{FlowEvent, FlowState, FlowTransitionError};

    #[test]
    fn sequence_exhaustion_names_the_day() {
        let error =
            DomainError::BookingSequenceExhausted { day_prefix: "LEG-20261017-".to_owned() };

        assert_eq!(error.to_string(), "booking sequence exhausted for LEG-20261017-");
    }

    #[test]
    fn flow_errors_convert_transparently() {
        let inner = FlowTransitionError::InvalidTransition {
            state: FlowState::Confirmed,
            event: FlowEvent::LawyersMatched,
        };
        let error = DomainError::from(inner.clone());

        assert_eq!(error.to_string(), inner.to_string());
    }
}
