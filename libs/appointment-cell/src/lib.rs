pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::appointment_routes;
pub use services::availability::{available_slots, candidate_slots, closure_reason, BookedInterval};
pub use services::AppointmentService;
