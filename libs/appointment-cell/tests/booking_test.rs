use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::AppointmentStatus;
use appointment_cell::services::booking::BookingService;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockStoreRows, TestConfig};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

/// Doctor with slots 09:00/10:00/11:00 and one booking at 10:00 on
/// 2024-06-01.
async fn mount_standard_day(server: &MockServer, doctor_id: Uuid) {
    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .and(query_param("select", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": doctor_id }])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .and(query_param("select", "available_times"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "available_times": ["09:00:00", "10:00:00", "11:00:00"] }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "appointment_time": "2024-06-01T10:00:00" }
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn booking_an_open_slot_creates_a_scheduled_appointment() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();

    mount_standard_day(&server, doctor_id).await;

    Mock::given(method("POST"))
        .and(path("/appointments"))
        .and(query_param("on_conflict", "doctor_id,appointment_time"))
        .and(header("Prefer", "resolution=ignore-duplicates,return=representation"))
        .and(body_partial_json(json!({
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "appointment_time": "2024-06-01T09:00:00",
            "status": 0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreRows::appointment(
                appointment_id,
                doctor_id,
                patient_id,
                "2024-06-01T09:00:00",
                0,
            )
        ])))
        .mount(&server)
        .await;

    let appointment = BookingService::new(&config)
        .book(patient_id, doctor_id, at("2024-06-01T09:00:00"))
        .await
        .unwrap();

    assert_eq!(appointment.id, appointment_id);
    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
}

#[tokio::test]
async fn booking_a_taken_slot_is_a_conflict() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let doctor_id = Uuid::new_v4();

    mount_standard_day(&server, doctor_id).await;

    let result = BookingService::new(&config)
        .book(Uuid::new_v4(), doctor_id, at("2024-06-01T10:00:00"))
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
}

#[tokio::test]
async fn booking_with_unknown_doctor_is_a_bad_request() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());

    Mock::given(method("GET"))
        .and(path("/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = BookingService::new(&config)
        .book(Uuid::new_v4(), Uuid::new_v4(), at("2024-06-01T09:00:00"))
        .await;

    assert!(matches!(result.unwrap_err(), AppError::BadRequest(_)));
}

#[tokio::test]
async fn losing_the_insert_race_is_the_same_conflict_as_a_taken_slot() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let doctor_id = Uuid::new_v4();

    mount_standard_day(&server, doctor_id).await;

    // Another booking won between the admission check and the insert; the
    // store ignores the duplicate and returns an empty representation.
    Mock::given(method("POST"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = BookingService::new(&config)
        .book(Uuid::new_v4(), doctor_id, at("2024-06-01T09:00:00"))
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
}

#[tokio::test]
async fn only_the_owning_patient_may_cancel() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let appointment_id = Uuid::new_v4();
    let owner = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::appointment(
                appointment_id,
                Uuid::new_v4(),
                owner,
                "2024-06-01T09:00:00",
                0,
            )
        ])))
        .mount(&server)
        .await;

    let result = BookingService::new(&config)
        .cancel(appointment_id, Uuid::new_v4())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Auth(_)));
}

#[tokio::test]
async fn cancelling_deletes_the_row() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let appointment_id = Uuid::new_v4();
    let owner = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::appointment(
                appointment_id,
                Uuid::new_v4(),
                owner,
                "2024-06-01T09:00:00",
                0,
            )
        ])))
        .mount(&server)
        .await;

    let delete = Mock::given(method("DELETE"))
        .and(path("/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount_as_scoped(&server)
        .await;

    BookingService::new(&config)
        .cancel(appointment_id, owner)
        .await
        .unwrap();

    drop(delete);
}

#[tokio::test]
async fn moving_an_appointment_revalidates_the_new_slot() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let doctor_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();
    let owner = Uuid::new_v4();

    mount_standard_day(&server, doctor_id).await;

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::appointment(
                appointment_id,
                doctor_id,
                owner,
                "2024-06-01T09:00:00",
                0,
            )
        ])))
        .mount(&server)
        .await;

    // 10:00 is already booked on the standard day.
    let result = BookingService::new(&config)
        .update(appointment_id, owner, at("2024-06-01T10:00:00"))
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
}

#[tokio::test]
async fn day_sheet_filters_by_patient_name_fragment() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": Uuid::new_v4(),
                "patient_id": Uuid::new_v4(),
                "appointment_time": "2024-06-01T09:00:00",
                "status": 0,
                "patient": { "name": "Ada Martin" }
            },
            {
                "id": Uuid::new_v4(),
                "patient_id": Uuid::new_v4(),
                "appointment_time": "2024-06-01T10:00:00",
                "status": 0,
                "patient": { "name": "Grace Chen" }
            }
        ])))
        .mount(&server)
        .await;

    let entries = BookingService::new(&config)
        .doctor_day(
            doctor_id,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            Some("martin"),
        )
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].patient_name, "Ada Martin");
}

#[tokio::test]
async fn changing_status_of_unknown_appointment_is_not_found() {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri());

    Mock::given(method("GET"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = BookingService::new(&config)
        .change_status(Uuid::new_v4(), AppointmentStatus::Completed)
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
}
