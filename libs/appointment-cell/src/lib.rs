pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{AdmissionOutcome, Appointment, AppointmentStatus};
pub use services::admission::AdmissionService;
pub use services::booking::BookingService;
