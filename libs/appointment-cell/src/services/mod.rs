pub mod availability;
pub mod scheduling;

pub use scheduling::AppointmentService;
