use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
}

/// One row of a patient's appointment history, with the doctor's name
/// resolved from the doctor registry.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentHistoryEntry {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub appointment_time: NaiveDateTime,
    pub status: i32,
}

/// History filter. `Past` selects completed appointments, `Future` the ones
/// still scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCondition {
    Past,
    Future,
}

impl HistoryCondition {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "past" => Some(Self::Past),
            "future" => Some(Self::Future),
            _ => None,
        }
    }

    /// The appointment status value the condition maps to.
    pub fn status(self) -> i32 {
        match self {
            Self::Past => 1,
            Self::Future => 0,
        }
    }
}
