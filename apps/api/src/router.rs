use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use consultation_cell::router::consultation_routes;
use contact_cell::router::contact_routes;
use doctor_cell::router::doctor_routes;
use payment_cell::router::payment_routes;
use shared_config::AppConfig;

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Amrutam Doctor Portal API is running",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/doctors", doctor_routes(state.clone()))
        .nest("/api/appointments", appointment_routes(state.clone()))
        .nest("/api/consultations", consultation_routes(state.clone()))
        .nest("/api/contact", contact_routes(state.clone()))
        .nest("/api/payments", payment_routes(state))
}
