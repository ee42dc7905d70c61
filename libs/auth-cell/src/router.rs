use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/admin/login", post(handlers::admin_login))
        .route("/doctor/login", post(handlers::doctor_login))
        .route("/patient/login", post(handlers::patient_login))
        .route("/validate/{role}", get(handlers::validate_token))
        .with_state(state)
}
