use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::appointment_routes;
use appointment_cell::services::booking::AppointmentBookingService;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn create_router(booking: Arc<AppointmentBookingService>) -> Router {
    Router::new()
        .route("/", get(|| async { "Trimline API is running!" }))
        .route("/health", get(health))
        .nest("/appointments", appointment_routes(booking))
}
