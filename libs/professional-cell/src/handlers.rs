use std::sync::Arc;

use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{RequestContext, ROLE_ADMIN};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{
    CreateProfessionalRequest, UpdateProfessionalRequest, ProfessionalListQuery, Professional,
};
use crate::services::ProfessionalService;

#[axum::debug_handler]
pub async fn create_professional(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<CreateProfessionalRequest>,
) -> Result<(StatusCode, Json<Professional>), AppError> {
    require_role(&ctx.user, &[ROLE_ADMIN])?;
    let service = ProfessionalService::new(&config);

    let professional = service.create_professional(request, ctx.token()).await?;

    Ok((StatusCode::CREATED, Json(professional)))
}

#[axum::debug_handler]
pub async fn list_professionals(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<ProfessionalListQuery>,
) -> Result<Json<Vec<Professional>>, AppError> {
    let service = ProfessionalService::new(&config);

    let professionals = service.list_professionals(query, ctx.token()).await?;

    Ok(Json(professionals))
}

#[axum::debug_handler]
pub async fn get_professional(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<Professional>, AppError> {
    let service = ProfessionalService::new(&config);

    let professional = service.get_professional(professional_id, ctx.token()).await?;

    Ok(Json(professional))
}

#[axum::debug_handler]
pub async fn update_professional(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(professional_id): Path<Uuid>,
    Json(request): Json<UpdateProfessionalRequest>,
) -> Result<Json<Professional>, AppError> {
    require_role(&ctx.user, &[ROLE_ADMIN])?;
    let service = ProfessionalService::new(&config);

    let professional = service
        .update_professional(professional_id, request, ctx.token())
        .await?;

    Ok(Json(professional))
}

#[axum::debug_handler]
pub async fn deactivate_professional(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(professional_id): Path<Uuid>,
) -> Result<Json<Professional>, AppError> {
    require_role(&ctx.user, &[ROLE_ADMIN])?;
    let service = ProfessionalService::new(&config);

    let professional = service
        .deactivate_professional(professional_id, ctx.token())
        .await?;

    Ok(Json(professional))
}
