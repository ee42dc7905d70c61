pub mod availability;
pub mod doctor;
