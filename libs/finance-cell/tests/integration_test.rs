use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{body_partial_json, method, path, query_param};

use finance_cell::router::finance_routes;
use shared_utils::test_utils::{TestConfig, TestUser, JwtTestUtils, MockSupabaseResponses};

fn app_for(mock_server: &MockServer, user: &TestUser) -> (Router, String) {
    let config = TestConfig::with_store(&mock_server.uri()).to_arc();
    let token = JwtTestUtils::create_test_token(user, &config.supabase_jwt_secret, Some(24));
    (finance_routes(config), token)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn tx(date: &str, kind: &str, amount: f64, role: Option<&str>) -> Value {
    MockSupabaseResponses::transaction_response(&Uuid::new_v4().to_string(), date, kind, amount, role)
}

#[tokio::test]
async fn test_summary_for_selected_month() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/transactions"))
        .and(query_param("date", "gte.2026-05-01"))
        .and(query_param("date", "lt.2026-11-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            tx("2026-10-02", "appointment_revenue", 200.0, Some("Nutricionista")),
            tx("2026-10-09", "other_revenue", 30.0, None),
            tx("2026-10-15", "expense", 20.0, None),
            tx("2026-07-01", "appointment_revenue", 180.0, Some("Psicólogo")),
        ])))
        .mount(&mock_server)
        .await;

    let (app, token) = app_for(&mock_server, &TestUser::admin("owner@example.com"));
    let request = Request::builder()
        .method("GET")
        .uri("/summary?month=9&year=2026")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["month"], 9);
    assert_eq!(json["summary"]["clinicTotalRevenue"], 70.0);
    assert_eq!(json["summary"]["totalExpenses"], 20.0);
    assert_eq!(json["summary"]["netProfit"], 50.0);
    assert_eq!(json["summary"]["totalBilledFromAppointments"], 200.0);

    let series = json["series"].as_array().unwrap();
    assert_eq!(series.len(), 6);
    assert_eq!(series[0]["label"], "2026-05");
    assert_eq!(series[2]["label"], "2026-07");
    assert_eq!(series[2]["clinicTotalRevenue"], 180.0);
    assert_eq!(series[5]["netProfit"], 50.0);
}

#[tokio::test]
async fn test_summary_rejects_month_out_of_range() {
    let mock_server = MockServer::start().await;
    let (app, token) = app_for(&mock_server, &TestUser::admin("owner@example.com"));

    let request = Request::builder()
        .method("GET")
        .uri("/summary?month=12&year=2026")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_finance_is_admin_only() {
    let mock_server = MockServer::start().await;
    let (app, token) = app_for(&mock_server, &TestUser::professional("psi@example.com"));

    let request = Request::builder()
        .method("GET")
        .uri("/summary")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_expense() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/transactions"))
        .and(body_partial_json(json!({ "kind": "expense", "amount": 350.0 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            tx("2026-10-05", "expense", 350.0, None)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (app, token) = app_for(&mock_server, &TestUser::admin("owner@example.com"));
    let request = Request::builder()
        .method("POST")
        .uri("/transactions")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({
            "date": "2026-10-05",
            "description": "Cleaning supplies",
            "amount": 350.0,
            "kind": "expense"
        }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_rejects_non_positive_amount() {
    let mock_server = MockServer::start().await;
    let (app, token) = app_for(&mock_server, &TestUser::admin("owner@example.com"));

    let request = Request::builder()
        .method("POST")
        .uri("/transactions")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({
            "date": "2026-10-05",
            "description": "Refund",
            "amount": -10.0,
            "kind": "other_revenue"
        }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_unknown_transaction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let (app, token) = app_for(&mock_server, &TestUser::admin("owner@example.com"));
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/transactions/{}", Uuid::new_v4()))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
