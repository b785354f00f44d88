use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::User;

use patient_cell::{PatientError, PatientService};

use crate::models::{
    ClinicalNote, ClinicalNoteError, CreateClinicalNoteRequest, UpdateClinicalNoteRequest,
};

fn db_error(err: anyhow::Error) -> ClinicalNoteError {
    ClinicalNoteError::DatabaseError(err.to_string())
}

fn parse_rows(rows: Vec<Value>) -> Result<Vec<ClinicalNote>, ClinicalNoteError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<ClinicalNote>, _>>()
        .map_err(|e| ClinicalNoteError::DatabaseError(e.to_string()))
}

pub struct ClinicalNoteService {
    supabase: SupabaseClient,
    patients: PatientService,
}

impl ClinicalNoteService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            patients: PatientService::new(config),
        }
    }

    pub async fn create_note(
        &self,
        request: CreateClinicalNoteRequest,
        author: &User,
        auth_token: &str,
    ) -> Result<ClinicalNote, ClinicalNoteError> {
        request.validate()?;

        self.patients
            .get_patient(request.patient_id, auth_token)
            .await
            .map_err(|e| match e {
                PatientError::NotFound => ClinicalNoteError::PatientNotFound,
                other => ClinicalNoteError::DatabaseError(other.to_string()),
            })?;

        debug!("Adding clinical note for patient {}", request.patient_id);

        let now = Utc::now().to_rfc3339();
        let note_data = json!({
            "patient_id": request.patient_id,
            "professional_id": request.professional_id,
            "appointment_id": request.appointment_id,
            "author_id": author.id,
            "content": request.content.trim(),
            "created_at": now,
            "updated_at": now
        });

        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/clinical_notes",
                Some(auth_token),
                Some(note_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(db_error)?;

        let note = parse_rows(result)?
            .into_iter()
            .next()
            .ok_or_else(|| ClinicalNoteError::DatabaseError("Failed to create clinical note".to_string()))?;

        info!("Clinical note {} created", note.id);
        Ok(note)
    }

    pub async fn get_note(
        &self,
        note_id: Uuid,
        auth_token: &str,
    ) -> Result<ClinicalNote, ClinicalNoteError> {
        let path = format!("/rest/v1/clinical_notes?id=eq.{}", note_id);
        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        parse_rows(result)?
            .into_iter()
            .next()
            .ok_or(ClinicalNoteError::NotFound)
    }

    /// Notes for one patient, newest first.
    pub async fn list_patient_notes(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<ClinicalNote>, ClinicalNoteError> {
        let path = format!(
            "/rest/v1/clinical_notes?patient_id=eq.{}&order=created_at.desc",
            patient_id
        );
        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        parse_rows(result)
    }

    pub async fn update_note(
        &self,
        note_id: Uuid,
        request: UpdateClinicalNoteRequest,
        editor: &User,
        auth_token: &str,
    ) -> Result<ClinicalNote, ClinicalNoteError> {
        request.validate()?;

        let note = self.get_note(note_id, auth_token).await?;
        if !note.editable_by(editor) {
            warn!("User {} tried to edit note {} written by {}", editor.id, note_id, note.author_id);
            return Err(ClinicalNoteError::NotAuthor);
        }

        let path = format!("/rest/v1/clinical_notes?id=eq.{}", note_id);
        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({
                    "content": request.content.trim(),
                    "updated_at": Utc::now().to_rfc3339()
                })),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(db_error)?;

        parse_rows(result)?
            .into_iter()
            .next()
            .ok_or(ClinicalNoteError::NotFound)
    }

    pub async fn delete_note(
        &self,
        note_id: Uuid,
        editor: &User,
        auth_token: &str,
    ) -> Result<(), ClinicalNoteError> {
        let note = self.get_note(note_id, auth_token).await?;
        if !note.editable_by(editor) {
            return Err(ClinicalNoteError::NotAuthor);
        }

        let path = format!("/rest/v1/clinical_notes?id=eq.{}", note_id);
        self.supabase
            .delete(&path, Some(auth_token))
            .await
            .map_err(db_error)?;

        info!("Clinical note {} deleted", note_id);
        Ok(())
    }
}
