use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn consultation_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_consultation))
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_consultations))
        .route("/stats/summary", get(handlers::consultation_stats))
        .route("/{consultation_id}", get(handlers::get_consultation))
        .route("/{consultation_id}", put(handlers::update_consultation))
        .route("/{consultation_id}/prescription", post(handlers::add_prescription))
        .route("/{consultation_id}/assessment", post(handlers::add_assessment))
        .with_state(state)
}
