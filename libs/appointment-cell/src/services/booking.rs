use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_models::error::AppError;
use shared_utils::time::{format_store_timestamp, parse_store_timestamp};

use crate::models::{
    AdmissionOutcome, Appointment, AppointmentStatus, DoctorDayEntry,
};
use crate::services::admission::AdmissionService;

pub struct BookingService {
    store: StoreClient,
    admission: AdmissionService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            admission: AdmissionService::new(config),
        }
    }

    /// Book a slot for a patient. Admission is checked first, then the
    /// insert defers the doctor/time uniqueness to the store: losing the
    /// race between check and insert surfaces as the same conflict as a
    /// taken slot.
    pub async fn book(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        appointment_time: NaiveDateTime,
    ) -> Result<Appointment, AppError> {
        self.admit(doctor_id, appointment_time.date(), appointment_time.time())
            .await?;

        let row = self
            .store
            .insert_unless_conflict(
                "appointments",
                "doctor_id,appointment_time",
                json!({
                    "id": Uuid::new_v4(),
                    "doctor_id": doctor_id,
                    "patient_id": patient_id,
                    "appointment_time": format_store_timestamp(&appointment_time),
                    "status": i32::from(AppointmentStatus::Scheduled),
                }),
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| {
                AppError::Conflict("Requested slot is not available.".to_string())
            })?;

        let appointment: Appointment =
            serde_json::from_value(row).map_err(|e| AppError::Internal(e.to_string()))?;
        debug!("Appointment {} booked", appointment.id);

        Ok(appointment)
    }

    /// Move an appointment to a new time. Only the owning patient may move
    /// it, and the new slot goes through the same admission check as a fresh
    /// booking.
    pub async fn update(
        &self,
        appointment_id: Uuid,
        patient_id: Uuid,
        new_time: NaiveDateTime,
    ) -> Result<Appointment, AppError> {
        let appointment = self.owned_appointment(appointment_id, patient_id).await?;

        self.admit(appointment.doctor_id, new_time.date(), new_time.time())
            .await?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let rows: Vec<Value> = self
            .store
            .request_with_headers(
                Method::PATCH,
                &format!("/appointments?id=eq.{}", appointment_id),
                Some(json!({
                    "appointment_time": format_store_timestamp(&new_time),
                })),
                Some(headers),
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Appointment not found.".to_string()))?;

        serde_json::from_value(row).map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Cancellation deletes the row; the freed slot becomes bookable again.
    pub async fn cancel(&self, appointment_id: Uuid, patient_id: Uuid) -> Result<(), AppError> {
        self.owned_appointment(appointment_id, patient_id).await?;

        let _: Vec<Value> = self
            .store
            .request(
                Method::DELETE,
                &format!("/appointments?id=eq.{}", appointment_id),
                None,
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        debug!("Appointment {} cancelled", appointment_id);
        Ok(())
    }

    /// A doctor's appointments for one day, earliest first, optionally
    /// narrowed to patients whose name contains the given fragment.
    pub async fn doctor_day(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        patient_name: Option<&str>,
    ) -> Result<Vec<DoctorDayEntry>, AppError> {
        let day_start = date.and_time(NaiveTime::MIN);
        let day_end = day_start + chrono::Duration::days(1);

        let path = format!(
            "/appointments?doctor_id=eq.{}&appointment_time=gte.{}&appointment_time=lt.{}&select=id,patient_id,appointment_time,status,patient:patients(name)&order=appointment_time.asc",
            doctor_id,
            format_store_timestamp(&day_start),
            format_store_timestamp(&day_end),
        );

        let rows: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut entries: Vec<DoctorDayEntry> =
            rows.iter().filter_map(Self::day_entry).collect();

        if let Some(fragment) = patient_name {
            let fragment = fragment.to_lowercase();
            entries.retain(|entry| entry.patient_name.to_lowercase().contains(&fragment));
        }

        Ok(entries)
    }

    /// Flip an appointment's status. Writing a prescription is the one
    /// caller that moves `Scheduled` to `Completed`.
    pub async fn change_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<(), AppError> {
        let known = self
            .store
            .exists(&format!("/appointments?id=eq.{}&select=id", appointment_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !known {
            return Err(AppError::NotFound("Appointment not found.".to_string()));
        }

        let _: Vec<Value> = self
            .store
            .request(
                Method::PATCH,
                &format!("/appointments?id=eq.{}", appointment_id),
                Some(json!({ "status": i32::from(status) })),
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>> {
        let rows: Vec<Value> = self
            .store
            .request(
                Method::GET,
                &format!("/appointments?id=eq.{}", appointment_id),
                None,
            )
            .await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    async fn admit(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<(), AppError> {
        match self.admission.check(doctor_id, date, time).await {
            AdmissionOutcome::DoctorNotFound => {
                Err(AppError::BadRequest("Doctor not found.".to_string()))
            }
            AdmissionOutcome::SlotUnavailable => Err(AppError::Conflict(
                "Requested slot is not available.".to_string(),
            )),
            AdmissionOutcome::Admitted => Ok(()),
        }
    }

    async fn owned_appointment(
        &self,
        appointment_id: Uuid,
        patient_id: Uuid,
    ) -> Result<Appointment, AppError> {
        let appointment = self
            .get_appointment(appointment_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Appointment not found.".to_string()))?;

        if appointment.patient_id != patient_id {
            return Err(AppError::Auth(
                "Appointment belongs to a different patient.".to_string(),
            ));
        }

        Ok(appointment)
    }

    fn day_entry(row: &Value) -> Option<DoctorDayEntry> {
        Some(DoctorDayEntry {
            id: serde_json::from_value(row["id"].clone()).ok()?,
            patient_id: serde_json::from_value(row["patient_id"].clone()).ok()?,
            patient_name: row["patient"]["name"].as_str().unwrap_or_default().to_string(),
            appointment_time: row["appointment_time"]
                .as_str()
                .and_then(parse_store_timestamp)?,
            status: AppointmentStatus::try_from(row["status"].as_i64()? as i32).ok()?,
        })
    }
}
