pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Doctor, TimePeriod};
pub use services::availability::AvailabilityService;
pub use services::doctor::DoctorService;
