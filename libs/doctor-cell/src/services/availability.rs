use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_utils::time::{format_store_timestamp, parse_store_timestamp};

/// Computes open appointment slots for a doctor on a date by subtracting
/// booked start times from the doctor's configured availability.
pub struct AvailabilityService {
    store: StoreClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Open slots for `doctor_id` on `date`, in the doctor's configured
    /// order. Empty when the doctor does not exist. The result is fully
    /// determined by current store state; nothing is cached.
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>> {
        debug!("Calculating available slots for doctor {} on {}", doctor_id, date);

        let path = format!("/doctors?id=eq.{}&select=available_times", doctor_id);
        let rows: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        let Some(row) = rows.first() else {
            debug!("Doctor {} not found, no slots", doctor_id);
            return Ok(Vec::new());
        };

        let configured: Vec<NaiveTime> = serde_json::from_value(row["available_times"].clone())?;

        let booked = self.booked_times(doctor_id, date).await?;

        Ok(configured
            .into_iter()
            .filter(|slot| !booked.contains(slot))
            .collect())
    }

    /// Start times (time-of-day component) of all appointments for the
    /// doctor within `[date 00:00, date+1 00:00)`.
    async fn booked_times(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<NaiveTime>> {
        let day_start = date.and_time(NaiveTime::MIN);
        let day_end = day_start + Duration::days(1);

        let path = format!(
            "/appointments?doctor_id=eq.{}&appointment_time=gte.{}&appointment_time=lt.{}&select=appointment_time&order=appointment_time.asc",
            doctor_id,
            format_store_timestamp(&day_start),
            format_store_timestamp(&day_end),
        );

        let rows: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        Ok(rows
            .iter()
            .filter_map(|row| row["appointment_time"].as_str())
            .filter_map(parse_store_timestamp)
            .map(|dt| dt.time())
            .collect())
    }
}
