use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use appointment_cell::models::AppointmentStatus;
use appointment_cell::services::booking::BookingService;
use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_models::error::AppError;

use crate::models::{Prescription, SavePrescriptionRequest};

pub struct PrescriptionService {
    store: StoreClient,
    booking: BookingService,
}

impl PrescriptionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            booking: BookingService::new(config),
        }
    }

    /// Write the prescription for an appointment and mark the appointment
    /// completed. The pre-check gives the common duplicate a clean message;
    /// the insert itself still defers uniqueness to the store, so a race
    /// between two writers resolves to one row and one conflict.
    pub async fn save(&self, request: SavePrescriptionRequest) -> Result<Prescription, AppError> {
        let appointment = self
            .booking
            .get_appointment(request.appointment_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Appointment not found.".to_string()))?;

        let written = self
            .store
            .exists(&format!(
                "/prescriptions?appointment_id=eq.{}&select=id",
                request.appointment_id
            ))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if written {
            return Err(AppError::Conflict(
                "Prescription already exists for this appointment.".to_string(),
            ));
        }

        let row = self
            .store
            .insert_unless_conflict(
                "prescriptions",
                "appointment_id",
                json!({
                    "id": Uuid::new_v4(),
                    "appointment_id": request.appointment_id,
                    "patient_name": request.patient_name,
                    "medication": request.medication,
                    "dosage": request.dosage,
                    "doctor_notes": request.doctor_notes,
                }),
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| {
                AppError::Conflict(
                    "Prescription already exists for this appointment.".to_string(),
                )
            })?;

        let prescription: Prescription =
            serde_json::from_value(row).map_err(|e| AppError::Internal(e.to_string()))?;

        self.booking
            .change_status(appointment.id, AppointmentStatus::Completed)
            .await?;

        debug!(
            "Prescription {} saved for appointment {}",
            prescription.id, appointment.id
        );

        Ok(prescription)
    }

    pub async fn get_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Prescription, AppError> {
        let rows: Vec<Value> = self
            .store
            .request(
                Method::GET,
                &format!("/prescriptions?appointment_id=eq.{}", appointment_id),
                None,
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let row = rows.into_iter().next().ok_or_else(|| {
            AppError::NotFound("No prescription for this appointment.".to_string())
        })?;

        serde_json::from_value(row).map_err(|e| AppError::Internal(e.to_string()))
    }
}
