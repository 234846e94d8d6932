//! JSON routes over the booking runtime.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use lexbook_agent::{
    BookingOutcome, BookingRuntime, ConfirmationRequest, ConfirmationRequestInput,
    InquiryRequest, InquiryRequestInput,
};
use lexbook_core::validation::{validate_appointment_request, ValidationError};
use lexbook_core::AppointmentRequestInput;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

pub const CORRELATION_ID_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

#[derive(Clone)]
pub struct ApiState {
    runtime: Arc<BookingRuntime>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InvalidRequest {
    pub status: &'static str,
    pub field: String,
    pub message: String,
    pub correlation_id: String,
}

pub fn router(runtime: Arc<BookingRuntime>) -> Router {
    Router::new()
        .route("/api/v1/bookings/inquiries", post(submit_inquiry))
        .route("/api/v1/bookings/search", post(search_availability))
        .route("/api/v1/bookings/confirmations", post(confirm_booking))
        .with_state(ApiState { runtime })
}

async fn submit_inquiry(
    State(state): State<ApiState>,
    payload: Result<Json<InquiryRequestInput>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let Json(input) = match payload {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection, &correlation_id),
    };
    let request = match InquiryRequest::validate(input, state.runtime.today()) {
        Ok(request) => request,
        Err(error) => return validation_rejected(error, &correlation_id),
    };

    let outcome = state.runtime.process_booking_request(request, &correlation_id).await;
    outcome_response(outcome, &correlation_id)
}

async fn search_availability(
    State(state): State<ApiState>,
    payload: Result<Json<AppointmentRequestInput>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let Json(input) = match payload {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection, &correlation_id),
    };
    let request = match validate_appointment_request(input, state.runtime.today()) {
        Ok(request) => request,
        Err(error) => return validation_rejected(error, &correlation_id),
    };

    let outcome = state.runtime.search_appointment_request(request, &correlation_id).await;
    outcome_response(outcome, &correlation_id)
}

async fn confirm_booking(
    State(state): State<ApiState>,
    payload: Result<Json<ConfirmationRequestInput>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let Json(input) = match payload {
        Ok(body) => body,
        Err(rejection) => return body_rejected(rejection, &correlation_id),
    };
    let request = match ConfirmationRequest::validate(input) {
        Ok(request) => request,
        Err(error) => return validation_rejected(error, &correlation_id),
    };

    let outcome = state.runtime.confirm_booking(request, &correlation_id).await;
    outcome_response(outcome, &correlation_id)
}

fn outcome_response(outcome: BookingOutcome, correlation_id: &str) -> Response {
    let status = if outcome.is_error() { StatusCode::BAD_GATEWAY } else { StatusCode::OK };
    info!(
        event_name = "api.request_completed",
        correlation_id,
        outcome = outcome.status(),
        http_status = status.as_u16(),
        "booking request completed"
    );
    (status, [(CORRELATION_ID_HEADER, correlation_id.to_owned())], Json(outcome)).into_response()
}

fn validation_rejected(error: ValidationError, correlation_id: &str) -> Response {
    let message = error.to_string();
    invalid_request(error.field, message, correlation_id)
}

fn body_rejected(rejection: JsonRejection, correlation_id: &str) -> Response {
    invalid_request("body".to_owned(), rejection.body_text(), correlation_id)
}

fn invalid_request(field: String, message: String, correlation_id: &str) -> Response {
    warn!(
        event_name = "api.request_rejected",
        correlation_id,
        field = %field,
        error = %message,
        "booking request failed validation"
    );
    let body = InvalidRequest {
        status: "invalid_request",
        field,
        message,
        correlation_id: correlation_id.to_owned(),
    };
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        [(CORRELATION_ID_HEADER, correlation_id.to_owned())],
        Json(body),
    )
        .into_response()
}
