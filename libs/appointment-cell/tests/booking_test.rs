use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{
    AppointmentError, BookAppointmentRequest, CancelRequest, ConsultationMode, RescheduleRequest,
    UpdateStatusRequest,
};
use appointment_cell::services::booking::BookingService;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

fn booking_request(doctor_id: Uuid) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id,
        patient_name: "Ravi Kumar".to_string(),
        patient_email: "ravi@example.com".to_string(),
        patient_phone: "9812345678".to_string(),
        patient_age: Some(34),
        appointment_date: NaiveDate::from_ymd_opt(2030, 6, 10).unwrap(),
        appointment_time: "09:00".to_string(),
        duration: Some(30),
        appointment_type: None,
        consultation_mode: ConsultationMode::Video,
        reason_for_visit: "Persistent acidity".to_string(),
        symptoms: Some(vec!["acidity".to_string()]),
        urgency_level: None,
        special_instructions: None,
    }
}

async fn mount_doctor(server: &MockServer, doctor_id: Uuid, doc: Value) {
    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({
            "collection": "doctors",
            "filter": { "id": doctor_id }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(doc)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn booking_a_taken_slot_is_rejected() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    mount_doctor(&server, doctor_id, MockStoreResponses::doctor(&doctor_id.to_string())).await;

    // The slot check finds a scheduled appointment at the same time.
    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "appointments" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(
            MockStoreResponses::appointment(&Uuid::new_v4().to_string(), &doctor_id.to_string()),
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::inserted()))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = BookingService::new(&config);

    let result = service.create_appointment(booking_request(doctor_id)).await;

    assert_matches!(result, Err(AppointmentError::SlotTaken));
}

#[tokio::test]
async fn booking_a_free_slot_creates_the_appointment() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    mount_doctor(&server, doctor_id, MockStoreResponses::doctor(&doctor_id.to_string())).await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "appointments" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one_missing()),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(body_partial_json(json!({ "collection": "appointments" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::inserted()))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = BookingService::new(&config);

    let appointment = service
        .create_appointment(booking_request(doctor_id))
        .await
        .unwrap();

    // Fee copied from the doctor, video mode gets a meeting link.
    assert_eq!(appointment.consultation_fee, 500.0);
    assert!(appointment.meeting_id.as_deref().unwrap().starts_with("amrutam-"));
    assert!(appointment
        .meeting_link
        .as_deref()
        .unwrap()
        .starts_with("https://meet.amrutam.com/"));
}

#[tokio::test]
async fn booking_with_unverified_doctor_is_rejected() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    let mut doctor = MockStoreResponses::doctor(&doctor_id.to_string());
    doctor["isVerified"] = json!(false);
    mount_doctor(&server, doctor_id, doctor).await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = BookingService::new(&config);

    let result = service.create_appointment(booking_request(doctor_id)).await;

    assert_matches!(result, Err(AppointmentError::DoctorNotAvailable));
}

fn appointment_doc_starting_in(hours: i64, rescheduling_count: i32) -> (Value, Uuid) {
    let id = Uuid::new_v4();
    let start = Utc::now() + Duration::hours(hours);
    let mut doc = MockStoreResponses::appointment(&id.to_string(), &Uuid::new_v4().to_string());
    doc["appointmentDate"] = json!(start.date_naive());
    doc["appointmentTime"] = json!(start.format("%H:%M").to_string());
    doc["reschedulingCount"] = json!(rescheduling_count);
    (doc, id)
}

#[tokio::test]
async fn cancelling_under_two_hours_before_start_is_rejected() {
    let server = MockServer::start().await;
    let (doc, id) = appointment_doc_starting_in(1, 0);

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(doc)))
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = BookingService::new(&config);

    let result = service
        .cancel(id, CancelRequest { reason: None, cancelled_by: None })
        .await;

    assert_matches!(result, Err(AppointmentError::CannotCancel));
}

#[tokio::test]
async fn cancelling_with_enough_notice_stamps_cancelled_at() {
    let server = MockServer::start().await;
    let (doc, id) = appointment_doc_starting_in(48, 0);

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(doc)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/updateOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::updated(1)))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = BookingService::new(&config);

    let appointment = service
        .cancel(
            id,
            CancelRequest {
                reason: Some("travel".to_string()),
                cancelled_by: None,
            },
        )
        .await
        .unwrap();

    assert!(appointment.cancelled_at.is_some());
    assert_eq!(appointment.cancellation_reason.as_deref(), Some("travel"));
}

#[tokio::test]
async fn reschedule_is_rejected_once_the_cap_is_reached() {
    let server = MockServer::start().await;
    // Plenty of notice, but the appointment has already moved twice.
    let (doc, id) = appointment_doc_starting_in(24 * 7, 2);

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(doc)))
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = BookingService::new(&config);

    let result = service
        .reschedule(
            id,
            RescheduleRequest {
                new_date: NaiveDate::from_ymd_opt(2030, 7, 1).unwrap(),
                new_time: "10:00".to_string(),
                reason: None,
                rescheduled_by: None,
            },
        )
        .await;

    assert_matches!(result, Err(AppointmentError::CannotReschedule));
}

#[tokio::test]
async fn reschedule_keeps_the_original_date_and_counts() {
    let server = MockServer::start().await;
    let (doc, id) = appointment_doc_starting_in(24 * 7, 0);
    let original_date = doc["appointmentDate"].clone();

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "filter": { "id": id } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(doc)))
        .mount(&server)
        .await;

    // New slot is free.
    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "filter": { "appointmentTime": "10:00" } })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one_missing()),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/updateOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::updated(1)))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = BookingService::new(&config);

    let appointment = service
        .reschedule(
            id,
            RescheduleRequest {
                new_date: NaiveDate::from_ymd_opt(2030, 7, 1).unwrap(),
                new_time: "10:00".to_string(),
                reason: Some("doctor request".to_string()),
                rescheduled_by: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(appointment.rescheduling_count, 1);
    assert_eq!(
        json!(appointment.original_appointment_date.unwrap()),
        original_date
    );
}

#[tokio::test]
async fn invalid_status_values_are_rejected() {
    let server = MockServer::start().await;
    let (doc, id) = appointment_doc_starting_in(48, 0);

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(doc)))
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = BookingService::new(&config);

    let result = service
        .update_status(
            id,
            UpdateStatusRequest {
                status: "postponed".to_string(),
                notes: None,
            },
        )
        .await;

    assert_matches!(result, Err(AppointmentError::InvalidStatus));
}
