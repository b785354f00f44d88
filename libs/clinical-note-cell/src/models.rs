use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use shared_models::auth::User;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalNote {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub professional_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClinicalNote {
    /// Only the author or an admin may change or remove a note.
    pub fn editable_by(&self, user: &User) -> bool {
        user.is_admin() || self.author_id == user.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClinicalNoteRequest {
    pub patient_id: Uuid,
    pub professional_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub content: String,
}

impl CreateClinicalNoteRequest {
    pub fn validate(&self) -> Result<(), ClinicalNoteError> {
        validate_content(&self.content)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClinicalNoteRequest {
    pub content: String,
}

impl UpdateClinicalNoteRequest {
    pub fn validate(&self) -> Result<(), ClinicalNoteError> {
        validate_content(&self.content)
    }
}

fn validate_content(content: &str) -> Result<(), ClinicalNoteError> {
    if content.trim().is_empty() {
        return Err(ClinicalNoteError::ValidationError("Note content is required".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClinicalNoteError {
    #[error("Clinical note not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Only the author or an admin can modify this note")]
    NotAuthor,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ClinicalNoteError> for AppError {
    fn from(err: ClinicalNoteError) -> Self {
        match err {
            ClinicalNoteError::NotFound | ClinicalNoteError::PatientNotFound => {
                AppError::NotFound(err.to_string())
            }
            ClinicalNoteError::NotAuthor => AppError::Forbidden(err.to_string()),
            ClinicalNoteError::ValidationError(msg) => AppError::ValidationError(msg),
            ClinicalNoteError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn note_by(author_id: &str) -> ClinicalNote {
        serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "patient_id": Uuid::new_v4(),
            "professional_id": null,
            "appointment_id": null,
            "author_id": author_id,
            "content": "Initial assessment",
            "created_at": "2026-10-01T12:00:00Z",
            "updated_at": "2026-10-01T12:00:00Z"
        }))
        .unwrap()
    }

    fn user(id: &str, role: &str) -> User {
        User {
            id: id.to_string(),
            email: None,
            role: Some(role.to_string()),
            metadata: None,
            created_at: None,
        }
    }

    #[test]
    fn blank_content_is_rejected() {
        let request = UpdateClinicalNoteRequest { content: "   \n".to_string() };
        assert_matches!(request.validate(), Err(ClinicalNoteError::ValidationError(_)));
    }

    #[test]
    fn author_and_admin_can_edit() {
        let note = note_by("author-1");

        assert!(note.editable_by(&user("author-1", "professional")));
        assert!(note.editable_by(&user("someone-else", "admin")));
        assert!(!note.editable_by(&user("someone-else", "professional")));
    }
}
