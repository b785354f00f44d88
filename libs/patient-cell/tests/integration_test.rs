use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use patient_cell::router::patient_routes;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils, MockSupabaseResponses};

struct Harness {
    app: Router,
    token: String,
}

fn harness(mock_server: &MockServer, user: &TestUser) -> Harness {
    let config = TestConfig::with_store(&mock_server.uri()).to_arc();
    let token = JwtTestUtils::create_test_token(user, &config.supabase_jwt_secret, Some(24));
    Harness {
        app: patient_routes(config),
        token,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_create_patient_returns_created_row() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::patient_response(&patient_id)
        ])))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &TestUser::receptionist("desk@example.com"));
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("authorization", format!("Bearer {}", h.token))
        .header("content-type", "application/json")
        .body(Body::from(json!({
            "full_name": "Maria Souza",
            "cpf": "123.456.789-00",
            "phone": "+55 11 99999-0000"
        }).to_string()))
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["id"], patient_id);
}

#[tokio::test]
async fn test_create_patient_duplicate_cpf_conflicts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("cpf", "eq.123.456.789-00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": Uuid::new_v4() }])))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &TestUser::receptionist("desk@example.com"));
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("authorization", format!("Bearer {}", h.token))
        .header("content-type", "application/json")
        .body(Body::from(json!({
            "full_name": "Maria Souza",
            "cpf": "123.456.789-00",
            "phone": "+55 11 99999-0000"
        }).to_string()))
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_patient_rejects_blank_name() {
    let mock_server = MockServer::start().await;
    let h = harness(&mock_server, &TestUser::receptionist("desk@example.com"));

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("authorization", format!("Bearer {}", h.token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "full_name": " ", "phone": "123" }).to_string()))
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_patient_is_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &TestUser::professional("psi@example.com"));
    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}", Uuid::new_v4()))
        .header("authorization", format!("Bearer {}", h.token))
        .body(Body::empty())
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_reports_total() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("full_name", "ilike.*Maria*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::patient_response(&Uuid::new_v4().to_string()),
            MockSupabaseResponses::patient_response(&Uuid::new_v4().to_string()),
        ])))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server, &TestUser::receptionist("desk@example.com"));
    let request = Request::builder()
        .method("GET")
        .uri("/search?name=Maria")
        .header("authorization", format!("Bearer {}", h.token))
        .body(Body::empty())
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 2);
}

#[tokio::test]
async fn test_delete_requires_admin() {
    let mock_server = MockServer::start().await;
    let h = harness(&mock_server, &TestUser::receptionist("desk@example.com"));

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/{}", Uuid::new_v4()))
        .header("authorization", format!("Bearer {}", h.token))
        .body(Body::empty())
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_requests_without_session_are_rejected() {
    let mock_server = MockServer::start().await;
    let h = harness(&mock_server, &TestUser::default());

    let request = Request::builder()
        .method("GET")
        .uri("/search")
        .body(Body::empty())
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
