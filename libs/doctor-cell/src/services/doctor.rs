use anyhow::Result;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_models::error::AppError;

use crate::models::{CreateDoctorRequest, Doctor, TimePeriod, UpdateDoctorRequest};

pub struct DoctorService {
    store: StoreClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Register a doctor. Email is the identity key, so a duplicate is a
    /// conflict rather than an internal error.
    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, AppError> {
        let taken = self
            .store
            .exists(&format!("/doctors?email=eq.{}&select=id", request.email))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if taken {
            return Err(AppError::Conflict(
                "Doctor with this email already exists.".to_string(),
            ));
        }

        let times: Vec<String> = request
            .available_times
            .iter()
            .map(|t| t.format("%H:%M:%S").to_string())
            .collect();

        let row = self
            .store
            .insert(
                "doctors",
                json!({
                    "id": Uuid::new_v4(),
                    "name": request.name,
                    "specialty": request.specialty,
                    "email": request.email,
                    "password": request.password,
                    "phone": request.phone,
                    "available_times": times,
                }),
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let doctor: Doctor =
            serde_json::from_value(row).map_err(|e| AppError::Internal(e.to_string()))?;
        debug!("Doctor created with ID: {}", doctor.id);

        Ok(doctor)
    }

    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, AppError> {
        let known = self
            .store
            .exists(&format!("/doctors?id=eq.{}&select=id", doctor_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !known {
            return Err(AppError::NotFound("Doctor not found.".to_string()));
        }

        let mut update = serde_json::Map::new();
        if let Some(name) = request.name {
            update.insert("name".to_string(), json!(name));
        }
        if let Some(specialty) = request.specialty {
            update.insert("specialty".to_string(), json!(specialty));
        }
        if let Some(phone) = request.phone {
            update.insert("phone".to_string(), json!(phone));
        }
        if let Some(password) = request.password {
            update.insert("password".to_string(), json!(password));
        }
        if let Some(times) = request.available_times {
            let times: Vec<String> = times.iter().map(|t| t.format("%H:%M:%S").to_string()).collect();
            update.insert("available_times".to_string(), json!(times));
        }

        let path = format!("/doctors?id=eq.{}", doctor_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let rows: Vec<Value> = self
            .store
            .request_with_headers(Method::PATCH, &path, Some(Value::Object(update)), Some(headers))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Doctor not found.".to_string()))?;

        serde_json::from_value(row).map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Removing a doctor also removes that doctor's appointments.
    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), AppError> {
        let known = self
            .store
            .exists(&format!("/doctors?id=eq.{}&select=id", doctor_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !known {
            return Err(AppError::NotFound("Doctor not found.".to_string()));
        }

        let _: Vec<Value> = self
            .store
            .request(
                Method::DELETE,
                &format!("/appointments?doctor_id=eq.{}", doctor_id),
                None,
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let _: Vec<Value> = self
            .store
            .request(Method::DELETE, &format!("/doctors?id=eq.{}", doctor_id), None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        debug!("Doctor {} deleted", doctor_id);
        Ok(())
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>> {
        let rows: Vec<Value> = self
            .store
            .request(Method::GET, &format!("/doctors?id=eq.{}", doctor_id), None)
            .await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// All doctors, or the subset matching the given filters. The name and
    /// specialty filters are pushed down to the store; the half-day filter
    /// runs over configured slot times here.
    pub async fn filter_doctors(
        &self,
        name: Option<&str>,
        specialty: Option<&str>,
        period: Option<TimePeriod>,
    ) -> Result<Vec<Doctor>> {
        let mut path = "/doctors?order=name.asc".to_string();
        if let Some(name) = name {
            path.push_str(&format!("&name=ilike.*{}*", name));
        }
        if let Some(specialty) = specialty {
            path.push_str(&format!("&specialty=ilike.{}", specialty));
        }

        let rows: Vec<Value> = self.store.request(Method::GET, &path, None).await?;
        let mut doctors: Vec<Doctor> = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Doctor>, _>>()?;

        if let Some(period) = period {
            doctors.retain(|doc| doc.available_times.iter().any(|t| period.contains(*t)));
        }

        Ok(doctors)
    }
}
