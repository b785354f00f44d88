use std::sync::Arc;
use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{RequestContext, ROLE_ADMIN, ROLE_PROFESSIONAL, ROLE_RECEPTIONIST};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{CreatePatientRequest, UpdatePatientRequest, PatientSearchQuery, Patient};
use crate::services::PatientService;

const STAFF: &[&str] = &[ROLE_ADMIN, ROLE_PROFESSIONAL, ROLE_RECEPTIONIST];

#[axum::debug_handler]
pub async fn create_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Patient>), AppError> {
    require_role(&ctx.user, STAFF)?;
    let service = PatientService::new(&config);

    let patient = service.create_patient(request, ctx.token()).await?;

    Ok((StatusCode::CREATED, Json(patient)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Patient>, AppError> {
    require_role(&ctx.user, STAFF)?;
    let service = PatientService::new(&config);

    let patient = service.get_patient(patient_id, ctx.token()).await?;

    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Patient>, AppError> {
    require_role(&ctx.user, STAFF)?;
    let service = PatientService::new(&config);

    let patient = service.update_patient(patient_id, request, ctx.token()).await?;

    Ok(Json(patient))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(patient_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&ctx.user, &[ROLE_ADMIN])?;
    let service = PatientService::new(&config);

    service.delete_patient(patient_id, ctx.token()).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn search_patients(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<Value>, AppError> {
    require_role(&ctx.user, STAFF)?;
    let service = PatientService::new(&config);

    let patients = service.search_patients(query, ctx.token()).await?;

    Ok(Json(json!({
        "total": patients.len(),
        "patients": patients,
    })))
}
