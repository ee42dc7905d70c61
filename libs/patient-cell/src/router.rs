use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn patient_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::register_patient))
        .route("/me", get(handlers::get_me))
        .route("/me/appointments", get(handlers::my_appointments))
        .with_state(state)
}
