use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn payment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/initiate", post(handlers::initiate_payment))
        .route("/complete", post(handlers::complete_payment))
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_payments))
        .route("/patient/{email}", get(handlers::get_patient_payments))
        .route("/earnings/{doctor_id}", get(handlers::doctor_earnings))
        .route("/withdraw/{doctor_id}", post(handlers::request_withdrawal))
        .route("/{transaction_id}", get(handlers::get_payment))
        .route("/{transaction_id}/refund", post(handlers::refund_payment))
        .with_state(state)
}
