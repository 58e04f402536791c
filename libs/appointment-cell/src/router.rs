// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};

use shared_utils::extractor::identity_middleware;

use crate::handlers;
use crate::services::booking::AppointmentBookingService;

/// All appointment operations require the gateway-resolved caller identity.
pub fn appointment_routes(service: Arc<AppointmentBookingService>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_appointments).post(handlers::book_appointment),
        )
        .route("/{appointment_id}", delete(handlers::cancel_appointment))
        .layer(middleware::from_fn(identity_middleware))
        .with_state(service)
}
