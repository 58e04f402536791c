// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;
use shared_models::session::SessionUser;

use crate::models::{BookAppointmentRequest, BookingError};
use crate::services::booking::AppointmentBookingService;

#[derive(Debug, Deserialize)]
pub struct ListQueryParams {
    pub page: Option<u32>,
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(service): State<Arc<AppointmentBookingService>>,
    Extension(user): Extension<SessionUser>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<Value>, AppError> {
    let appointments = service
        .list_appointments(user.id, params.page.unwrap_or(1))
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Extension(user): Extension<SessionUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .book_appointment(user.id, request)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<i64>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .cancel_appointment(user.id, appointment_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!(appointment)))
}

/// Domain errors become transport errors here and nowhere else.
fn map_booking_error(err: BookingError) -> AppError {
    match err {
        BookingError::InvalidInput(msg) => AppError::BadRequest(msg),
        BookingError::SelfBookingNotAllowed
        | BookingError::PastDateNotAllowed
        | BookingError::CancellationWindowExpired => AppError::BadRequest(err.to_string()),
        BookingError::NotAProvider | BookingError::NotOwner => AppError::Auth(err.to_string()),
        BookingError::NotFound => AppError::NotFound(err.to_string()),
        BookingError::SlotUnavailable => AppError::Conflict(err.to_string()),
        BookingError::Database(msg) => AppError::Database(msg),
    }
}
