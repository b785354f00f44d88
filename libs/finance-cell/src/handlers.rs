use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{RequestContext, ROLE_ADMIN};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{
    CreateTransactionRequest, FinanceReport, MonthSelection, SummaryQuery, Transaction,
    TransactionQuery,
};
use crate::services::FinanceService;

#[axum::debug_handler]
pub async fn create_transaction(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    require_role(&ctx.user, &[ROLE_ADMIN])?;
    let service = FinanceService::new(&config);

    let transaction = service.create_transaction(request, ctx.token()).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[axum::debug_handler]
pub async fn list_transactions(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    require_role(&ctx.user, &[ROLE_ADMIN])?;
    let service = FinanceService::new(&config);

    let transactions = service.list_transactions(query, ctx.token()).await?;

    Ok(Json(transactions))
}

#[axum::debug_handler]
pub async fn delete_transaction(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&ctx.user, &[ROLE_ADMIN])?;
    let service = FinanceService::new(&config);

    service.delete_transaction(transaction_id, ctx.token()).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn get_summary(
    State(config): State<Arc<AppConfig>>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<FinanceReport>, AppError> {
    require_role(&ctx.user, &[ROLE_ADMIN])?;
    let selection = MonthSelection::resolve(query.month, query.year, Local::now().date_naive())?;
    let service = FinanceService::new(&config);

    let report = service.report(selection, ctx.token()).await?;

    Ok(Json(report))
}
