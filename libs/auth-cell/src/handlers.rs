use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::HeaderMap,
};
use serde::Deserialize;
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{LoginResponse, Role, TokenValidationResponse};
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;

use crate::services::authorizer::AuthorizerService;
use crate::services::login::LoginService;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[axum::debug_handler]
pub async fn admin_login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<AdminLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = LoginService::new(&config)
        .admin_login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse { token }))
}

#[axum::debug_handler]
pub async fn doctor_login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = LoginService::new(&config)
        .doctor_login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse { token }))
}

#[axum::debug_handler]
pub async fn patient_login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = LoginService::new(&config)
        .patient_login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse { token }))
}

/// Check the caller's token against a role given as a path segment. An
/// unrecognized role is reported as invalid, exactly like a bad token.
#[axum::debug_handler]
pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    Path(role): Path<String>,
    headers: HeaderMap,
) -> Result<Json<TokenValidationResponse>, AppError> {
    debug!("Validating token for role {}", role);

    let token = extract_bearer_token(&headers)?;

    let valid = match role.parse::<Role>() {
        Ok(role) => {
            AuthorizerService::new(&config)
                .is_authorized(&token, role)
                .await
        }
        Err(e) => {
            debug!("{}", e);
            false
        }
    };

    Ok(Json(TokenValidationResponse { valid }))
}
