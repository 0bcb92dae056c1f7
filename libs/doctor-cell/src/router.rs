use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/register", post(handlers::register_doctor))
        .route("/login", post(handlers::login_doctor))
        .route("/", get(handlers::list_doctors))
        .route("/stats/summary", get(handlers::doctor_stats))
        .route("/search/{query}", get(handlers::search_doctors))
        .route("/auth/validate", get(handlers::validate_session))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route("/{doctor_id}", put(handlers::update_doctor))
        .with_state(state)
}
