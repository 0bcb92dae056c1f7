use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use contact_cell::models::{ContactError, InquiryType, Priority, RespondRequest, SubmitContactRequest};
use contact_cell::services::inbox::{InboxService, SubmissionContext};
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

fn submit_request(inquiry_type: Option<InquiryType>) -> SubmitContactRequest {
    SubmitContactRequest {
        name: Some("Kiran Patel".to_string()),
        email: Some("Kiran@Example.com".to_string()),
        phone: Some("9876501234".to_string()),
        subject: Some("Refund status".to_string()),
        message: Some("My refund has not arrived".to_string()),
        inquiry_type,
    }
}

#[tokio::test]
async fn submit_requires_name_email_phone_and_message() {
    let config = TestConfig::default().to_app_config();
    let service = InboxService::new(&config);

    let request = SubmitContactRequest {
        name: Some("Kiran Patel".to_string()),
        email: None,
        phone: Some("9876501234".to_string()),
        subject: None,
        message: Some("hello".to_string()),
        inquiry_type: None,
    };

    let result = service.submit(request, SubmissionContext::default()).await;

    assert_matches!(result, Err(ContactError::ValidationError(_)));
}

#[tokio::test]
async fn billing_inquiries_are_triaged_high_and_stored() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(body_partial_json(json!({ "collection": "contacts" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::inserted()))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = InboxService::new(&config);

    let contact = service
        .submit(
            submit_request(Some(InquiryType::Billing)),
            SubmissionContext {
                user_agent: Some("test-agent".to_string()),
                ip_address: None,
                referrer_page: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(contact.priority, Priority::High);
    assert_eq!(contact.email, "kiran@example.com");
    assert_eq!(contact.user_agent.as_deref(), Some("test-agent"));
}

#[tokio::test]
async fn feedback_inquiries_are_triaged_low() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::inserted()))
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = InboxService::new(&config);

    let contact = service
        .submit(
            submit_request(Some(InquiryType::Feedback)),
            SubmissionContext::default(),
        )
        .await
        .unwrap();

    assert_eq!(contact.priority, Priority::Low);
}

#[tokio::test]
async fn responding_requires_a_message() {
    let config = TestConfig::default().to_app_config();
    let service = InboxService::new(&config);

    let result = service
        .respond(
            uuid::Uuid::new_v4(),
            RespondRequest {
                message: Some("   ".to_string()),
                responded_by: None,
            },
        )
        .await;

    assert_matches!(result, Err(ContactError::ValidationError(_)));
}
