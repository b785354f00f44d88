use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use shared_models::error::AppError;

/// A member of the clinic's care staff. `role` is the professional title
/// as written on the schedule (e.g. "Psicólogo", "Nutricionista") and
/// drives the revenue split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: Uuid,
    pub full_name: String,
    pub role: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub registration_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfessionalRequest {
    pub full_name: String,
    pub role: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub registration_number: Option<String>,
}

impl CreateProfessionalRequest {
    pub fn validate(&self) -> Result<(), ProfessionalError> {
        if self.full_name.trim().is_empty() {
            return Err(ProfessionalError::ValidationError("Full name is required".to_string()));
        }
        if self.role.trim().is_empty() {
            return Err(ProfessionalError::ValidationError("Role is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfessionalRequest {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub registration_number: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfessionalListQuery {
    pub active_only: Option<bool>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfessionalError {
    #[error("Professional not found")]
    NotFound,

    #[error("Professional is inactive")]
    Inactive,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ProfessionalError> for AppError {
    fn from(err: ProfessionalError) -> Self {
        match err {
            ProfessionalError::NotFound => AppError::NotFound(err.to_string()),
            ProfessionalError::Inactive => AppError::Conflict(err.to_string()),
            ProfessionalError::ValidationError(msg) => AppError::ValidationError(msg),
            ProfessionalError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
