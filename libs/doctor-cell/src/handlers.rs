use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use auth_cell::require_role;
use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_models::error::AppError;

use crate::models::{CreateDoctorRequest, TimePeriod, UpdateDoctorRequest};
use crate::services::availability::AvailabilityService;
use crate::services::doctor::DoctorService;

#[derive(Debug, Deserialize)]
pub struct DoctorFilterQuery {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub time_period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    /// Role the caller claims; the token must validate for it.
    pub role: String,
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DoctorFilterQuery>,
) -> Result<Json<Value>, AppError> {
    let period = query.time_period.as_deref().and_then(TimePeriod::parse);

    let doctors = DoctorService::new(&state)
        .filter_doctors(query.name.as_deref(), query.specialty.as_deref(), period)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<uuid::Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(&state)
        .get_doctor(doctor_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Doctor not found.".to_string()))?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&state, &headers, Role::Admin).await?;

    let doctor = DoctorService::new(&state).create_doctor(request).await?;

    Ok((StatusCode::CREATED, Json(json!(doctor))))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<uuid::Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&state, &headers, Role::Admin).await?;

    let doctor = DoctorService::new(&state)
        .update_doctor(doctor_id, request)
        .await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<uuid::Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    require_role(&state, &headers, Role::Admin).await?;

    DoctorService::new(&state).delete_doctor(doctor_id).await?;

    Ok(Json(json!({ "message": "Doctor deleted successfully." })))
}

/// Open slots for a doctor on a date. Any of the three roles may ask, but
/// the token must validate for the role the caller states.
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<uuid::Uuid>,
    Query(query): Query<AvailabilityQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let role: Role = query
        .role
        .parse()
        .map_err(|_| AppError::Auth("Invalid or expired token.".to_string()))?;
    require_role(&state, &headers, role).await?;

    let slots = AvailabilityService::new(&state)
        .available_slots(doctor_id, query.date)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let slots: Vec<String> = slots.iter().map(|t| t.format("%H:%M").to_string()).collect();

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "available_slots": slots
    })))
}
