use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Appointment lifecycle: `Scheduled` until a prescription is written, then
/// `Completed`. Cancellation deletes the row instead of transitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
}

impl TryFrom<i32> for AppointmentStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Scheduled),
            1 => Ok(Self::Completed),
            other => Err(format!("unknown appointment status: {}", other)),
        }
    }
}

impl From<AppointmentStatus> for i32 {
    fn from(status: AppointmentStatus) -> i32 {
        match status {
            AppointmentStatus::Scheduled => 0,
            AppointmentStatus::Completed => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

/// Result of asking whether a doctor can take a new appointment at a given
/// moment. Internal faults during evaluation collapse into `SlotUnavailable`;
/// callers never see an error from the check itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    DoctorNotFound,
    SlotUnavailable,
    Admitted,
}

#[derive(Debug, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub appointment_time: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub appointment_time: NaiveDateTime,
}

/// One appointment on a doctor's day sheet, with the patient's name resolved
/// from the patient registry.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorDayEntry {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_wire_value() {
        assert_eq!(AppointmentStatus::try_from(0), Ok(AppointmentStatus::Scheduled));
        assert_eq!(AppointmentStatus::try_from(1), Ok(AppointmentStatus::Completed));
        assert!(AppointmentStatus::try_from(2).is_err());
        assert!(AppointmentStatus::try_from(-1).is_err());

        assert_eq!(i32::from(AppointmentStatus::Scheduled), 0);
        assert_eq!(i32::from(AppointmentStatus::Completed), 1);
    }

    #[test]
    fn appointments_deserialize_from_store_rows() {
        let appointment: Appointment = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "doctor_id": Uuid::new_v4(),
            "patient_id": Uuid::new_v4(),
            "appointment_time": "2024-06-01T10:00:00",
            "status": 0
        }))
        .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(
            appointment.appointment_time.to_string(),
            "2024-06-01 10:00:00"
        );
    }
}
