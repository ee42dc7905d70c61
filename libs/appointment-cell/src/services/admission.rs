use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};
use uuid::Uuid;

use doctor_cell::services::availability::AvailabilityService;
use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::AdmissionOutcome;

/// Decides whether a doctor can take an appointment at a specific moment.
pub struct AdmissionService {
    store: StoreClient,
    availability: AvailabilityService,
}

impl AdmissionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            availability: AvailabilityService::new(config),
        }
    }

    /// Unknown doctor wins over slot state. This never errors: a fault while
    /// evaluating is logged and reported as an unavailable slot, so outages
    /// reject bookings rather than admit them.
    pub async fn check(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> AdmissionOutcome {
        match self.evaluate(doctor_id, date, time).await {
            Ok(outcome) => {
                debug!(
                    "Admission check for doctor {} at {} {}: {:?}",
                    doctor_id, date, time, outcome
                );
                outcome
            }
            Err(e) => {
                warn!("Admission check for doctor {} failed: {}", doctor_id, e);
                AdmissionOutcome::SlotUnavailable
            }
        }
    }

    async fn evaluate(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<AdmissionOutcome> {
        let known = self
            .store
            .exists(&format!("/doctors?id=eq.{}&select=id", doctor_id))
            .await?;

        if !known {
            return Ok(AdmissionOutcome::DoctorNotFound);
        }

        let open = self.availability.available_slots(doctor_id, date).await?;

        if open.contains(&time) {
            Ok(AdmissionOutcome::Admitted)
        } else {
            Ok(AdmissionOutcome::SlotUnavailable)
        }
    }
}
