use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use auth_cell::router::auth_routes;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils};

#[tokio::test]
async fn test_session_endpoint_returns_context_user() {
    let config = TestConfig::default().to_arc();
    let app = auth_routes(config.clone());

    let user = TestUser::professional("psi@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let request = Request::builder()
        .method("GET")
        .uri("/session")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["user_id"], user.id);
    assert_eq!(json["role"], "professional");
}

#[tokio::test]
async fn test_session_endpoint_requires_token() {
    let app = auth_routes(TestConfig::default().to_arc());

    let request = Request::builder()
        .method("GET")
        .uri("/session")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validate_endpoint_with_cookie() {
    let config = TestConfig::default().to_arc();
    let app = auth_routes(config.clone());

    let user = TestUser::admin("owner@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(1));

    let request = Request::builder()
        .method("POST")
        .uri("/validate")
        .header("cookie", format!("{}={}", config.session_cookie_name, token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
