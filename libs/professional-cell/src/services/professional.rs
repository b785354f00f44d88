use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use chrono::Utc;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{
    Professional, CreateProfessionalRequest, UpdateProfessionalRequest,
    ProfessionalListQuery, ProfessionalError,
};

fn db_error(err: anyhow::Error) -> ProfessionalError {
    ProfessionalError::DatabaseError(err.to_string())
}

fn parse_rows(rows: Vec<Value>) -> Result<Vec<Professional>, ProfessionalError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<Professional>, _>>()
        .map_err(|e| ProfessionalError::DatabaseError(e.to_string()))
}

pub struct ProfessionalService {
    supabase: SupabaseClient,
}

impl ProfessionalService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_professional(
        &self,
        request: CreateProfessionalRequest,
        auth_token: &str,
    ) -> Result<Professional, ProfessionalError> {
        request.validate()?;
        debug!("Creating professional {} ({})", request.full_name, request.role);

        let now = Utc::now().to_rfc3339();
        let professional_data = json!({
            "full_name": request.full_name.trim(),
            "role": request.role.trim(),
            "email": request.email,
            "phone": request.phone,
            "registration_number": request.registration_number,
            "is_active": true,
            "created_at": now,
            "updated_at": now
        });

        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/professionals",
                Some(auth_token),
                Some(professional_data),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(db_error)?;

        let professional = parse_rows(result)?
            .into_iter()
            .next()
            .ok_or_else(|| ProfessionalError::DatabaseError("Failed to create professional".to_string()))?;

        info!("Professional created with ID: {}", professional.id);
        Ok(professional)
    }

    pub async fn get_professional(
        &self,
        professional_id: Uuid,
        auth_token: &str,
    ) -> Result<Professional, ProfessionalError> {
        debug!("Fetching professional: {}", professional_id);

        let path = format!("/rest/v1/professionals?id=eq.{}", professional_id);
        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        parse_rows(result)?
            .into_iter()
            .next()
            .ok_or(ProfessionalError::NotFound)
    }

    /// Fetches a professional who can still take bookings.
    pub async fn get_active_professional(
        &self,
        professional_id: Uuid,
        auth_token: &str,
    ) -> Result<Professional, ProfessionalError> {
        let professional = self.get_professional(professional_id, auth_token).await?;
        if !professional.is_active {
            warn!("Professional {} is inactive", professional_id);
            return Err(ProfessionalError::Inactive);
        }
        Ok(professional)
    }

    pub async fn list_professionals(
        &self,
        query: ProfessionalListQuery,
        auth_token: &str,
    ) -> Result<Vec<Professional>, ProfessionalError> {
        let mut filters = vec![];
        if query.active_only.unwrap_or(false) {
            filters.push("is_active=eq.true".to_string());
        }
        if let Some(role) = &query.role {
            filters.push(format!("role=eq.{}", urlencoding::encode(role)));
        }
        filters.push("order=full_name.asc".to_string());

        let path = format!("/rest/v1/professionals?{}", filters.join("&"));
        let result: Vec<Value> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(db_error)?;

        parse_rows(result)
    }

    pub async fn update_professional(
        &self,
        professional_id: Uuid,
        request: UpdateProfessionalRequest,
        auth_token: &str,
    ) -> Result<Professional, ProfessionalError> {
        debug!("Updating professional: {}", professional_id);

        let mut update_data = Map::new();

        if let Some(full_name) = request.full_name {
            if full_name.trim().is_empty() {
                return Err(ProfessionalError::ValidationError("Full name cannot be empty".to_string()));
            }
            update_data.insert("full_name".to_string(), json!(full_name.trim()));
        }
        if let Some(role) = request.role {
            if role.trim().is_empty() {
                return Err(ProfessionalError::ValidationError("Role cannot be empty".to_string()));
            }
            update_data.insert("role".to_string(), json!(role.trim()));
        }
        if let Some(email) = request.email {
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(registration_number) = request.registration_number {
            update_data.insert("registration_number".to_string(), json!(registration_number));
        }
        if let Some(is_active) = request.is_active {
            update_data.insert("is_active".to_string(), json!(is_active));
        }

        self.patch(professional_id, update_data, auth_token).await
    }

    /// Professionals are never hard-deleted; past appointments and
    /// transactions keep pointing at them.
    pub async fn deactivate_professional(
        &self,
        professional_id: Uuid,
        auth_token: &str,
    ) -> Result<Professional, ProfessionalError> {
        let mut update_data = Map::new();
        update_data.insert("is_active".to_string(), json!(false));

        let professional = self.patch(professional_id, update_data, auth_token).await?;
        info!("Professional {} deactivated", professional_id);
        Ok(professional)
    }

    async fn patch(
        &self,
        professional_id: Uuid,
        mut update_data: Map<String, Value>,
        auth_token: &str,
    ) -> Result<Professional, ProfessionalError> {
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/professionals?id=eq.{}", professional_id);
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

        parse_rows(result)?
            .into_iter()
            .next()
            .ok_or(ProfessionalError::NotFound)
    }
}
