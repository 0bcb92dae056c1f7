use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn contact_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::submit_contact))
        .route("/", get(handlers::list_contacts))
        .route("/pending", get(handlers::pending_contacts))
        .route("/stats/summary", get(handlers::contact_stats))
        .route("/{contact_id}", get(handlers::get_contact))
        .route("/{contact_id}/status", put(handlers::update_contact_status))
        .route("/{contact_id}/respond", post(handlers::respond_to_contact))
        .route("/{contact_id}/resolve", put(handlers::resolve_contact))
        .with_state(state)
}
