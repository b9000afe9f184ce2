use assert_matches::assert_matches;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::models::{PatientError, UpdateProfileRequest};
use patient_cell::services::profile::ProfileService;
use shared_utils::test_utils::TestConfig;

fn stored_patient(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Asha Verma",
        "email": "asha@example.com",
        "password_hash": "$argon2id$fake",
        "image": null,
        "phone": "5550001111",
        "address": {"line1": "9 Lake Road"},
        "gender": "Female",
        "dob": "1990-04-02",
        "created_at": "2024-02-01T10:00:00Z",
    })
}

fn update_request() -> UpdateProfileRequest {
    UpdateProfileRequest {
        name: Some("Asha Verma".to_string()),
        phone: Some("5550002222".to_string()),
        address: Some(json!({"line1": "12 Hill Road"})),
        dob: Some("1990-04-02".to_string()),
        gender: Some("Female".to_string()),
    }
}

fn service_for(server: &MockServer) -> ProfileService {
    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    ProfileService::new(&config)
}

#[tokio::test]
async fn profile_serialization_never_carries_the_hash() {
    let server = MockServer::start().await;
    let patient_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_patient(&patient_id)])))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let patient = service
        .get_profile(&patient_id)
        .await
        .expect("profile fetch should succeed");

    let serialized = serde_json::to_value(&patient).unwrap();
    assert!(serialized.get("password_hash").is_none());
    assert_eq!(serialized["email"], "asha@example.com");
}

#[tokio::test]
async fn missing_profile_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let result = service.get_profile("no-such-user").await;

    assert_matches!(result, Err(PatientError::NotFound));
}

#[tokio::test]
async fn update_patches_the_stored_document() {
    let server = MockServer::start().await;
    let patient_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_patient(&patient_id)])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(&server);
    service
        .update_profile(&patient_id, update_request())
        .await
        .expect("update should succeed");
}

#[tokio::test]
async fn partial_updates_are_rejected_before_any_write() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let service = service_for(&server);

    let mut missing_phone = update_request();
    missing_phone.phone = None;
    assert_matches!(
        service.update_profile("someone", missing_phone).await,
        Err(PatientError::Validation(_))
    );

    let mut missing_address = update_request();
    missing_address.address = None;
    assert_matches!(
        service.update_profile("someone", missing_address).await,
        Err(PatientError::Validation(_))
    );
}

#[tokio::test]
async fn duplicate_registration_email_is_rejected() {
    let server = MockServer::start().await;
    let patient_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("email", "eq.asha@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_patient(&patient_id)])))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let result = service
        .create_patient("Asha Verma", "asha@example.com", "longenough")
        .await;

    assert_matches!(result, Err(PatientError::EmailExists));
}
