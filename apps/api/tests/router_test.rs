use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use clinic_api::create_router;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_root_is_public() {
    let app = create_router(TestConfig::default().to_arc());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cells_require_a_session() {
    let config = TestConfig::default().to_arc();

    for uri in ["/patients/search", "/professionals", "/appointments", "/finance/summary"] {
        let response = create_router(config.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let config = TestConfig::default().to_arc();
    let user = TestUser::professional("psi@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(1));

    let request = Request::builder()
        .uri("/auth/session")
        .header("cookie", format!("{}={}", config.session_cookie_name, token))
        .body(Body::empty())
        .unwrap();

    let response = create_router(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_slot_computation_through_nested_router() {
    let config = TestConfig::default().to_arc();
    let user = TestUser::receptionist("desk@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(1));

    let request = Request::builder()
        .method("POST")
        .uri("/appointments/available-slots/compute")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "date": "2026-12-25",
                "candidates": ["08:00", "09:00"],
                "booked": []
            })
            .to_string(),
        ))
        .unwrap();

    let response = create_router(config).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["closed"], true);
    assert_eq!(json["reason"], "holiday");
    assert_eq!(json["slots"], json!([]));
}
