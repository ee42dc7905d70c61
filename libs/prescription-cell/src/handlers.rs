use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::{json, Value};

use auth_cell::require_role;
use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_models::error::AppError;

use crate::models::SavePrescriptionRequest;
use crate::services::prescription::PrescriptionService;

#[axum::debug_handler]
pub async fn save_prescription(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
    Json(request): Json<SavePrescriptionRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&state, &headers, Role::Doctor).await?;

    let prescription = PrescriptionService::new(&state).save(request).await?;

    Ok((StatusCode::CREATED, Json(json!(prescription))))
}

#[axum::debug_handler]
pub async fn get_prescription(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<uuid::Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    require_role(&state, &headers, Role::Doctor).await?;

    let prescription = PrescriptionService::new(&state)
        .get_by_appointment(appointment_id)
        .await?;

    Ok(Json(json!(prescription)))
}
