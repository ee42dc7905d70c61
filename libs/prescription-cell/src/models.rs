use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// At most one prescription per appointment; `appointment_id` is unique in
/// the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_name: String,
    pub medication: String,
    pub dosage: String,
    pub doctor_notes: String,
}

#[derive(Debug, Deserialize)]
pub struct SavePrescriptionRequest {
    pub appointment_id: Uuid,
    pub patient_name: String,
    pub medication: String,
    pub dosage: String,
    pub doctor_notes: String,
}
