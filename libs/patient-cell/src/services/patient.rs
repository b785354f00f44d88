use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use chrono::Utc;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{api_error, SupabaseClient};

use crate::models::{Patient, CreatePatientRequest, UpdatePatientRequest, PatientSearchQuery, PatientError};

const DEFAULT_PAGE_SIZE: i32 = 50;

fn db_error(err: anyhow::Error) -> PatientError {
    PatientError::DatabaseError(err.to_string())
}

fn first_row(rows: Vec<Value>) -> Result<Patient, PatientError> {
    let row = rows.into_iter().next().ok_or(PatientError::NotFound)?;
    serde_json::from_value(row).map_err(|e| PatientError::DatabaseError(e.to_string()))
}

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        request.validate()?;
        debug!("Registering patient: {}", request.full_name);

        if let Some(cpf) = &request.cpf {
            let path = format!("/rest/v1/patients?cpf=eq.{}&select=id", urlencoding::encode(cpf));
            let existing: Vec<Value> = self.supabase
                .request(Method::GET, &path, Some(auth_token), None)
                .await
                .map_err(db_error)?;

            if !existing.is_empty() {
                return Err(PatientError::CpfAlreadyExists { cpf: cpf.clone() });
            }
        }

        let now = Utc::now().to_rfc3339();
        let patient_data = json!({
            "full_name": request.full_name.trim(),
            "cpf": request.cpf,
            "email": request.email,
            "phone": request.phone.trim(),
            "date_of_birth": request.date_of_birth,
            "address": request.address,
            "notes": request.notes,
            "created_at": now,
            "updated_at": now
        });

        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/patients",
                Some(auth_token),
                Some(patient_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(|e| match (api_error(&e), &request.cpf) {
                (Some(api), Some(cpf)) if api.is_conflict() => {
                    PatientError::CpfAlreadyExists { cpf: cpf.clone() }
                }
                _ => db_error(e),
            })?;

        let patient = first_row(result)
            .map_err(|_| PatientError::DatabaseError("Failed to create patient".to_string()))?;
        info!("Patient registered with ID: {}", patient.id);

        Ok(patient)
    }

    pub async fn get_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        first_row(result)
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient: {}", patient_id);

        let mut update_data = Map::new();

        if let Some(full_name) = request.full_name {
            if full_name.trim().is_empty() {
                return Err(PatientError::ValidationError("Full name cannot be empty".to_string()));
            }
            update_data.insert("full_name".to_string(), json!(full_name.trim()));
        }
        if let Some(phone) = request.phone {
            if phone.trim().is_empty() {
                return Err(PatientError::ValidationError("Phone cannot be empty".to_string()));
            }
            update_data.insert("phone".to_string(), json!(phone.trim()));
        }
        if let Some(cpf) = request.cpf {
            update_data.insert("cpf".to_string(), json!(cpf));
        }
        if let Some(email) = request.email {
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(date_of_birth) = request.date_of_birth {
            update_data.insert("date_of_birth".to_string(), json!(date_of_birth));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(update_data)),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(db_error)?;

        first_row(result)
    }

    pub async fn delete_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<(), PatientError> {
        // Surfaces NotFound instead of a silent no-op delete.
        self.get_patient(patient_id, auth_token).await?;

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        self.supabase
            .delete(&path, Some(auth_token))
            .await
            .map_err(db_error)?;

        info!("Patient {} deleted", patient_id);
        Ok(())
    }

    pub async fn search_patients(
        &self,
        query: PatientSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Patient>, PatientError> {
        debug!("Searching patients with query: {:?}", query);

        let path = format!("/rest/v1/patients?{}", Self::search_filters(&query));

        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Patient>, _>>()
            .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    fn search_filters(query: &PatientSearchQuery) -> String {
        let mut parts = vec![];

        if let Some(name) = &query.name {
            parts.push(format!("full_name=ilike.*{}*", urlencoding::encode(name)));
        }
        if let Some(phone) = &query.phone {
            parts.push(format!("phone=ilike.*{}*", urlencoding::encode(phone)));
        }
        if let Some(cpf) = &query.cpf {
            parts.push(format!("cpf=eq.{}", urlencoding::encode(cpf)));
        }

        parts.push("order=full_name.asc".to_string());
        parts.push(format!("limit={}", query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 200)));
        parts.push(format!("offset={}", query.offset.unwrap_or(0).max(0)));

        parts.join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_filters_encode_and_page() {
        let query = PatientSearchQuery {
            name: Some("Ana Maria".to_string()),
            limit: Some(1000),
            ..Default::default()
        };

        let filters = PatientService::search_filters(&query);
        assert!(filters.contains("full_name=ilike.*Ana%20Maria*"));
        assert!(filters.contains("limit=200"));
        assert!(filters.ends_with("offset=0"));
    }
}
