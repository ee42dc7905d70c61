use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A doctor record. `available_times` is the fixed set of schedulable start
/// times configured at registration; it is not date-dependent and is
/// read-only at booking time. The stored credential never serializes back
/// out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    pub phone: String,
    #[serde(default)]
    pub available_times: Vec<NaiveTime>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    #[serde(default)]
    pub available_times: Vec<NaiveTime>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub available_times: Option<Vec<NaiveTime>>,
}

/// Half-day filter over a doctor's configured slots. AM is strictly before
/// noon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
    Am,
    Pm,
}

impl TimePeriod {
    /// Unrecognized strings mean "no filter", matching the lenient behavior
    /// of the search endpoints.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "AM" => Some(TimePeriod::Am),
            "PM" => Some(TimePeriod::Pm),
            _ => None,
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).expect("noon is a valid time");
        match self {
            TimePeriod::Am => time < noon,
            TimePeriod::Pm => time >= noon,
        }
    }
}
