use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use serde_json::{json, Value};

use auth_cell::require_role;
use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;

use crate::models::CreatePatientRequest;
use crate::services::patient::PatientService;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub condition: Option<String>,
    pub doctor_name: Option<String>,
}

#[axum::debug_handler]
pub async fn register_patient(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient = PatientService::new(&state).create_patient(request).await?;

    Ok((StatusCode::CREATED, Json(json!(patient))))
}

#[axum::debug_handler]
pub async fn get_me(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    require_role(&state, &headers, Role::Patient).await?;
    let token = extract_bearer_token(&headers)?;

    let patient = PatientService::new(&state).get_patient_details(&token).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn my_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    require_role(&state, &headers, Role::Patient).await?;
    let token = extract_bearer_token(&headers)?;

    let service = PatientService::new(&state);
    let patient = service.get_patient_details(&token).await?;
    let appointments = service
        .appointment_history(
            patient.id,
            query.condition.as_deref(),
            query.doctor_name.as_deref(),
        )
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}
