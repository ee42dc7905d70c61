use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use auth_cell::require_role;
use patient_cell::services::patient::PatientService;
use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;

use crate::models::{
    AppointmentStatus, BookAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::booking::BookingService;

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: NaiveDate,
    pub patient_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: i32,
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&state, &headers, Role::Patient).await?;
    let token = extract_bearer_token(&headers)?;

    let patient = PatientService::new(&state).get_patient_details(&token).await?;

    let appointment = BookingService::new(&state)
        .book(patient.id, request.doctor_id, request.appointment_time)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<uuid::Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&state, &headers, Role::Patient).await?;
    let token = extract_bearer_token(&headers)?;

    let patient = PatientService::new(&state).get_patient_details(&token).await?;

    let appointment = BookingService::new(&state)
        .update(appointment_id, patient.id, request.appointment_time)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<uuid::Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    require_role(&state, &headers, Role::Patient).await?;
    let token = extract_bearer_token(&headers)?;

    let patient = PatientService::new(&state).get_patient_details(&token).await?;

    BookingService::new(&state)
        .cancel(appointment_id, patient.id)
        .await?;

    Ok(Json(json!({ "message": "Appointment cancelled successfully." })))
}

/// A doctor's day sheet, optionally narrowed by patient name.
#[axum::debug_handler]
pub async fn doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<uuid::Uuid>,
    Query(query): Query<DayQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    require_role(&state, &headers, Role::Doctor).await?;

    let appointments = BookingService::new(&state)
        .doctor_day(doctor_id, query.date, query.patient_name.as_deref())
        .await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn update_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<uuid::Uuid>,
    headers: HeaderMap,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&state, &headers, Role::Doctor).await?;

    let status = AppointmentStatus::try_from(request.status)
        .map_err(|_| AppError::BadRequest("Unknown appointment status.".to_string()))?;

    BookingService::new(&state)
        .change_status(appointment_id, status)
        .await?;

    Ok(Json(json!({ "message": "Appointment status updated." })))
}
