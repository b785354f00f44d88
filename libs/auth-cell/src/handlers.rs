use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::HeaderMap,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::{RequestContext, TokenResponse};
use shared_models::error::AppError;
use shared_utils::extractor::extract_token;
use shared_utils::jwt::validate_token;

pub async fn validate_session_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating session token");

    let token = extract_token(&headers, &config.session_cookie_name)?;
    let user = validate_token(&token, &config.supabase_jwt_secret)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

/// Like [`validate_session_token`] but never fails on a bad token.
pub async fn verify_session_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying session token");

    let token = extract_token(&headers, &config.session_cookie_name)?;
    let valid = validate_token(&token, &config.supabase_jwt_secret).is_ok();

    Ok(Json(json!({ "valid": valid })))
}

pub async fn current_session(
    Extension(ctx): Extension<RequestContext>,
) -> Json<Value> {
    Json(json!({
        "user_id": ctx.user.id,
        "email": ctx.user.email,
        "role": ctx.user.role,
    }))
}
