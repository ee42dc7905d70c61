pub mod admission;
pub mod booking;
