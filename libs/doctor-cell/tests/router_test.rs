use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::router::doctor_routes;
use shared_utils::test_utils::{TestConfig, TestPrincipal};

fn stored_doctor(id: &str, available: bool) -> Value {
    json!({
        "id": id,
        "name": "Dr. Richa Sharma",
        "email": "richa@example.com",
        "password_hash": "$argon2id$fake",
        "image": null,
        "speciality": "Dermatologist",
        "degree": "MBBS",
        "experience": "4 Years",
        "about": "Focused on preventive care.",
        "fees": 60.0,
        "address": {"line1": "37 Gala Street"},
        "available": available,
        "slots_booked": {},
        "created_at": "2024-01-15T08:00:00Z",
    })
}

fn toggle_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/change-availability")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from("{}")).unwrap()
}

async fn body_of(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn protected_routes_reject_missing_tokens() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let app = doctor_routes(config.to_arc());

    let response = app.oneshot(toggle_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_of(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn patients_cannot_reach_the_availability_toggle() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let app = doctor_routes(config.to_arc());

    let patient = TestPrincipal::patient("asha@example.com");
    let token = config.mint_token(&patient.id, patient.role);

    let response = app.oneshot(toggle_request(Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_of(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn doctors_toggle_their_own_availability_through_the_router() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let app = doctor_routes(config.to_arc());

    let doctor = TestPrincipal::doctor("richa@example.com");
    let token = config.mint_token(&doctor.id, doctor.role);

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_doctor(
            &doctor.id, true
        )])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor.id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let response = app.oneshot(toggle_request(Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_of(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["available"], false);
}
