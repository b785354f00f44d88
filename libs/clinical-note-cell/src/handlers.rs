use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{RequestContext, ROLE_ADMIN, ROLE_PROFESSIONAL};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{ClinicalNote, CreateClinicalNoteRequest, UpdateClinicalNoteRequest};
use crate::services::ClinicalNoteService;

// Receptionists never see clinical content.
const CLINICIANS: &[&str] = &[ROLE_ADMIN, ROLE_PROFESSIONAL];

#[axum::debug_handler]
pub async fn create_note(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<CreateClinicalNoteRequest>,
) -> Result<(StatusCode, Json<ClinicalNote>), AppError> {
    require_role(&ctx.user, CLINICIANS)?;
    let service = ClinicalNoteService::new(&config);

    let note = service.create_note(request, &ctx.user, ctx.token()).await?;

    Ok((StatusCode::CREATED, Json(note)))
}

#[axum::debug_handler]
pub async fn list_patient_notes(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<ClinicalNote>>, AppError> {
    require_role(&ctx.user, CLINICIANS)?;
    let service = ClinicalNoteService::new(&config);

    let notes = service.list_patient_notes(patient_id, ctx.token()).await?;

    Ok(Json(notes))
}

#[axum::debug_handler]
pub async fn get_note(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(note_id): Path<Uuid>,
) -> Result<Json<ClinicalNote>, AppError> {
    require_role(&ctx.user, CLINICIANS)?;
    let service = ClinicalNoteService::new(&config);

    let note = service.get_note(note_id, ctx.token()).await?;

    Ok(Json(note))
}

#[axum::debug_handler]
pub async fn update_note(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(note_id): Path<Uuid>,
    Json(request): Json<UpdateClinicalNoteRequest>,
) -> Result<Json<ClinicalNote>, AppError> {
    require_role(&ctx.user, CLINICIANS)?;
    let service = ClinicalNoteService::new(&config);

    let note = service.update_note(note_id, request, &ctx.user, ctx.token()).await?;

    Ok(Json(note))
}

#[axum::debug_handler]
pub async fn delete_note(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(note_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&ctx.user, CLINICIANS)?;
    let service = ClinicalNoteService::new(&config);

    service.delete_note(note_id, &ctx.user, ctx.token()).await?;

    Ok(StatusCode::NO_CONTENT)
}
