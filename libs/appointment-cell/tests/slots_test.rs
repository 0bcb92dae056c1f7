use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::services::slots::SlotService;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

// 2030-06-10 is a Monday, matching the mock doctor's availability template.
const MONDAY: &str = "2030-06-10";

#[tokio::test]
async fn booked_times_are_subtracted_from_the_template() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "doctors" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(
            MockStoreResponses::doctor(&doctor_id.to_string()),
        )))
        .mount(&server)
        .await;

    // One existing booking at 09:00.
    Mock::given(method("POST"))
        .and(path("/action/find"))
        .and(body_partial_json(json!({ "collection": "appointments" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find(vec![
            MockStoreResponses::appointment(&Uuid::new_v4().to_string(), &doctor_id.to_string()),
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = SlotService::new(&config);

    let date = MONDAY.parse::<NaiveDate>().unwrap();
    let slots = service.available_slots(doctor_id, date).await.unwrap();

    assert_eq!(slots.day_name, "Monday");
    assert_eq!(slots.total_slots, 2);
    assert_eq!(slots.booked_slots, 1);
    assert_eq!(slots.available_slots.len(), 1);
    assert_eq!(slots.available_slots[0].start_time, "09:30");
}

#[tokio::test]
async fn days_without_availability_return_no_slots() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "doctors" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(
            MockStoreResponses::doctor(&doctor_id.to_string()),
        )))
        .mount(&server)
        .await;

    // No availability template exists for Tuesday, so the appointment
    // collection is never consulted.
    Mock::given(method("POST"))
        .and(path("/action/find"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_empty()))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = SlotService::new(&config);

    let date = "2030-06-11".parse::<NaiveDate>().unwrap();
    let slots = service.available_slots(doctor_id, date).await.unwrap();

    assert_eq!(slots.day_name, "Tuesday");
    assert!(slots.available_slots.is_empty());
    assert_eq!(slots.total_slots, 0);
}
