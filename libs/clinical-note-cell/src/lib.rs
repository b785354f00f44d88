pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{ClinicalNote, ClinicalNoteError, CreateClinicalNoteRequest, UpdateClinicalNoteRequest};
pub use router::clinical_note_routes;
pub use services::ClinicalNoteService;
