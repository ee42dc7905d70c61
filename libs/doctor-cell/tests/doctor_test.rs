use chrono::NaiveTime;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::models::{CreateDoctorRequest, TimePeriod};
use doctor_cell::services::doctor::DoctorService;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockStoreRows, TestConfig};

fn create_request(email: &str) -> CreateDoctorRequest {
    CreateDoctorRequest {
        name: "Dr. Test".to_string(),
        specialty: "cardiology".to_string(),
        email: email.to_string(),
        password: "secret".to_string(),
        phone: "5551234567".to_string(),
        available_times: vec![
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        ],
    }
}

#[tokio::test]
async fn create_doctor_persists_and_returns_record() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("email", "eq.new@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/doctors"))
        .and(body_partial_json(json!({
            "email": "new@example.com",
            "available_times": ["09:00:00", "10:00:00"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreRows::doctor(doctor_id, "new@example.com", &["09:00:00", "10:00:00"])
        ])))
        .mount(&server)
        .await;

    let doctor = DoctorService::new(&config)
        .create_doctor(create_request("new@example.com"))
        .await
        .unwrap();

    assert_eq!(doctor.id, doctor_id);
    assert_eq!(doctor.email, "new@example.com");
}

#[tokio::test]
async fn create_doctor_with_taken_email_is_a_conflict() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("email", "eq.dup@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::doctor(Uuid::new_v4(), "dup@example.com", &[])
        ])))
        .mount(&server)
        .await;

    let result = DoctorService::new(&config)
        .create_doctor(create_request("dup@example.com"))
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
}

#[tokio::test]
async fn update_unknown_doctor_is_not_found() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = DoctorService::new(&config)
        .update_doctor(
            Uuid::new_v4(),
            doctor_cell::models::UpdateDoctorRequest {
                name: Some("Dr. Renamed".to_string()),
                specialty: None,
                phone: None,
                password: None,
                available_times: None,
            },
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
}

#[tokio::test]
async fn delete_doctor_cascades_appointments() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": doctor_id }])))
        .mount(&server)
        .await;

    let appointment_delete = Mock::given(method("DELETE"))
        .and(path("/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount_as_scoped(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    DoctorService::new(&config)
        .delete_doctor(doctor_id)
        .await
        .unwrap();

    drop(appointment_delete);
}

#[tokio::test]
async fn half_day_filter_runs_over_configured_slots() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::doctor(Uuid::new_v4(), "morning@example.com", &["09:00:00"]),
            MockStoreRows::doctor(Uuid::new_v4(), "evening@example.com", &["15:00:00"]),
        ])))
        .mount(&server)
        .await;

    let service = DoctorService::new(&config);

    let morning = service
        .filter_doctors(None, None, Some(TimePeriod::Am))
        .await
        .unwrap();
    assert_eq!(morning.len(), 1);
    assert_eq!(morning[0].email, "morning@example.com");

    let evening = service
        .filter_doctors(None, None, Some(TimePeriod::Pm))
        .await
        .unwrap();
    assert_eq!(evening.len(), 1);
    assert_eq!(evening[0].email, "evening@example.com");
}
