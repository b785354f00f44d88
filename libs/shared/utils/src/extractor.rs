use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use headers::{Cookie, HeaderMapExt};

use shared_config::AppConfig;
use shared_models::auth::{RequestContext, User};
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Pulls the session token from `Authorization: Bearer` first, then from the
/// session cookie.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, AppError> {
    if let Some(auth_header) = headers.get("Authorization") {
        let auth_value = auth_header
            .to_str()
            .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

        return match auth_value.strip_prefix("Bearer ") {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(AppError::Auth("Invalid authorization header format".to_string())),
        };
    }

    headers
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(cookie_name).map(str::to_string))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))
}

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers(), &config.session_cookie_name)?;

    let user = validate_token(&token, &config.supabase_jwt_secret)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    request
        .extensions_mut()
        .insert(RequestContext::new(user, token));

    Ok(next.run(request).await)
}

/// Rejects the request unless the user holds one of `roles`.
pub fn require_role(user: &User, roles: &[&str]) -> Result<(), AppError> {
    match user.role.as_deref() {
        Some(role) if roles.contains(&role) => Ok(()),
        _ => Err(AppError::Forbidden(format!(
            "Requires one of the roles: {}",
            roles.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    use crate::test_utils::TestUser;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer header-token"));
        headers.insert("cookie", HeaderValue::from_static("clinic_session=cookie-token"));

        assert_eq!(extract_token(&headers, "clinic_session").unwrap(), "header-token");
    }

    #[test]
    fn falls_back_to_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("theme=dark; clinic_session=cookie-token"),
        );

        assert_eq!(extract_token(&headers, "clinic_session").unwrap(), "cookie-token");
    }

    #[test]
    fn rejects_missing_or_malformed_credentials() {
        let headers = HeaderMap::new();
        assert_matches!(
            extract_token(&headers, "clinic_session"),
            Err(AppError::Auth(msg)) if msg == "Missing authorization header"
        );

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Token abc"));
        assert_matches!(
            extract_token(&headers, "clinic_session"),
            Err(AppError::Auth(msg)) if msg == "Invalid authorization header format"
        );
    }

    #[tokio::test]
    async fn middleware_inserts_request_context() {
        use axum::{middleware, routing::get, Extension, Router};
        use tower::ServiceExt;

        use crate::test_utils::{JwtTestUtils, TestConfig};

        let config = TestConfig::default().to_arc();
        let user = TestUser::professional("psi@example.com");
        let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(1));

        let app = Router::new()
            .route("/", get(|Extension(ctx): Extension<RequestContext>| async move { ctx.user.id }))
            .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
            .with_state(config);

        let request = Request::builder()
            .uri("/")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, user.id.as_bytes());

        let expired = JwtTestUtils::create_expired_token(&user, "test-secret-key-for-jwt-validation-must-be-long-enough");
        let request = Request::builder()
            .uri("/")
            .header("authorization", format!("Bearer {}", expired))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn role_guard() {
        let admin = TestUser::admin("boss@example.com").to_user();
        let desk = TestUser::receptionist("desk@example.com").to_user();

        assert!(require_role(&admin, &["admin"]).is_ok());
        assert_matches!(require_role(&desk, &["admin"]), Err(AppError::Forbidden(_)));
    }
}
