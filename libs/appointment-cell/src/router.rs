use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_appointment))
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_appointments))
        .route("/patient/{email}", get(handlers::get_patient_appointments))
        .route("/slots/{doctor_id}/{date}", get(handlers::get_available_slots))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/status", put(handlers::update_appointment_status))
        .route("/{appointment_id}/reschedule", put(handlers::reschedule_appointment))
        .route("/{appointment_id}/cancel", put(handlers::cancel_appointment))
        .with_state(state)
}
