pub mod professional;

pub use professional::ProfessionalService;
