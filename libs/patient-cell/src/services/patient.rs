use anyhow::Result;
use regex::Regex;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_models::error::AppError;
use shared_utils::time::parse_store_timestamp;
use shared_utils::token::TokenCodec;

use crate::models::{AppointmentHistoryEntry, CreatePatientRequest, HistoryCondition, Patient};

pub struct PatientService {
    codec: TokenCodec,
    store: StoreClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            codec: TokenCodec::new(&config.jwt_secret),
            store: StoreClient::new(config),
        }
    }

    /// Register a patient. Both email and phone are identity keys, so a row
    /// matching either one is a conflict.
    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, AppError> {
        let phone_format = Regex::new(r"^[0-9]{10}$").unwrap();
        if !phone_format.is_match(&request.phone) {
            return Err(AppError::BadRequest(
                "Phone number must be exactly 10 digits.".to_string(),
            ));
        }

        let taken = self
            .store
            .exists(&format!(
                "/patients?or=(email.eq.{},phone.eq.{})&select=id",
                request.email, request.phone
            ))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if taken {
            return Err(AppError::Conflict(
                "Patient with this email or phone already exists.".to_string(),
            ));
        }

        let row = self
            .store
            .insert(
                "patients",
                json!({
                    "id": Uuid::new_v4(),
                    "name": request.name,
                    "email": request.email,
                    "password": request.password,
                    "phone": request.phone,
                    "address": request.address,
                }),
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let patient: Patient =
            serde_json::from_value(row).map_err(|e| AppError::Internal(e.to_string()))?;
        debug!("Patient registered with ID: {}", patient.id);

        Ok(patient)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Patient>> {
        let rows: Vec<Value> = self
            .store
            .request(Method::GET, &format!("/patients?email=eq.{}&limit=1", email), None)
            .await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Resolve the calling patient from a bearer token's subject.
    pub async fn get_patient_details(&self, token: &str) -> Result<Patient, AppError> {
        let email = self
            .codec
            .parse_subject(token)
            .map_err(|_| AppError::Auth("Invalid or expired token.".to_string()))?;

        self.find_by_email(&email)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Patient not found.".to_string()))
    }

    /// The patient's appointments, oldest first. `condition` narrows to past
    /// (completed) or future (scheduled) appointments; an unrecognized value
    /// matches nothing. `doctor_name` keeps rows whose doctor's name contains
    /// the fragment, case-insensitively.
    pub async fn appointment_history(
        &self,
        patient_id: Uuid,
        condition: Option<&str>,
        doctor_name: Option<&str>,
    ) -> Result<Vec<AppointmentHistoryEntry>, AppError> {
        let status = match condition {
            None => None,
            Some(raw) => match HistoryCondition::parse(raw) {
                Some(parsed) => Some(parsed.status()),
                None => {
                    warn!("Unrecognized appointment condition: {}", raw);
                    return Ok(Vec::new());
                }
            },
        };

        let mut path = format!(
            "/appointments?patient_id=eq.{}&select=id,doctor_id,appointment_time,status,doctor:doctors(name)&order=appointment_time.asc",
            patient_id
        );
        if let Some(status) = status {
            path.push_str(&format!("&status=eq.{}", status));
        }

        let rows: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut entries: Vec<AppointmentHistoryEntry> =
            rows.iter().filter_map(Self::history_entry).collect();

        if let Some(fragment) = doctor_name {
            let fragment = fragment.to_lowercase();
            entries.retain(|entry| entry.doctor_name.to_lowercase().contains(&fragment));
        }

        Ok(entries)
    }

    fn history_entry(row: &Value) -> Option<AppointmentHistoryEntry> {
        Some(AppointmentHistoryEntry {
            id: serde_json::from_value(row["id"].clone()).ok()?,
            doctor_id: serde_json::from_value(row["doctor_id"].clone()).ok()?,
            doctor_name: row["doctor"]["name"].as_str().unwrap_or_default().to_string(),
            appointment_time: row["appointment_time"]
                .as_str()
                .and_then(parse_store_timestamp)?,
            status: row["status"].as_i64()? as i32,
        })
    }
}
