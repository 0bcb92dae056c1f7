use assert_matches::assert_matches;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use payment_cell::models::{
    CompletePaymentRequest, DoctorEarning, FeeBreakdown, InitiatePaymentRequest, Payment,
    PaymentError, PaymentMethod, PaymentProvider, PaymentState, RefundRequest, ServiceModel,
    ServiceType, SettlementStatus, WithdrawRequest, DEFAULT_COMMISSION_PERCENTAGE,
};
use payment_cell::services::earnings::EarningsService;
use payment_cell::services::payment::PaymentService;
use shared_utils::test_utils::{MockStoreResponses, TestConfig};

fn completed_payment(doctor_id: Uuid, status: PaymentState) -> Payment {
    let now = Utc::now();
    let breakdown = FeeBreakdown::compute(500.0);
    Payment {
        id: Uuid::new_v4(),
        transaction_id: "TXN_1750000000000_abcdefghi".to_string(),
        order_id: "ORD_1750000000000_abcdef".to_string(),
        doctor_id,
        patient_email: "ravi@example.com".to_string(),
        patient_name: "Ravi Kumar".to_string(),
        service_type: ServiceType::Appointment,
        service_id: Uuid::new_v4(),
        service_model: ServiceModel::Appointment,
        amount: breakdown.total_amount,
        currency: "INR".to_string(),
        consultation_fee: breakdown.consultation_fee,
        platform_fee: breakdown.platform_fee,
        processing_fee: breakdown.processing_fee,
        taxes: breakdown.taxes(),
        discount_amount: 0.0,
        payment_method: PaymentMethod::Card,
        payment_provider: PaymentProvider::Razorpay,
        status,
        payment_date: Some(now),
        gateway_response: None,
        refunds: vec![],
        doctor_earning: DoctorEarning::compute(500.0, DEFAULT_COMMISSION_PERCENTAGE),
        settlement_status: SettlementStatus::Pending,
        settlement_date: None,
        settlement_id: None,
        billing_address: None,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

fn payment_doc(payment: &Payment) -> Value {
    serde_json::to_value(payment).unwrap()
}

#[tokio::test]
async fn initiate_computes_the_fee_breakdown() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let service_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "doctors" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(
            MockStoreResponses::doctor(&doctor_id.to_string()),
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "appointments" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(
            MockStoreResponses::appointment(&service_id.to_string(), &doctor_id.to_string()),
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/insertOne"))
        .and(body_partial_json(json!({ "collection": "payments" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::inserted()))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = PaymentService::new(&config);

    let initiated = service
        .initiate(InitiatePaymentRequest {
            doctor_id,
            patient_email: "ravi@example.com".to_string(),
            patient_name: "Ravi Kumar".to_string(),
            service_type: ServiceType::Appointment,
            service_id,
            payment_method: None,
            billing_address: None,
        })
        .await
        .unwrap();

    // 500 + 25 platform + 10 processing + 5 GST on the platform fee.
    assert_eq!(initiated.payment.amount, 540.0);
    assert_eq!(initiated.payment.platform_fee, 25.0);
    assert_eq!(initiated.payment.processing_fee, 10.0);
    assert_eq!(initiated.payment.taxes.gst, 5.0);
    assert_eq!(initiated.payment.doctor_earning.net_amount, 425.0);
    assert_eq!(initiated.payment.status, PaymentState::Pending);
    assert!(initiated.payment.transaction_id.starts_with("TXN_"));
    assert_eq!(initiated.gateway_response["status"], "created");
}

#[tokio::test]
async fn initiate_rejects_unknown_service() {
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

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "consultations" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one_missing()),
        )
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = PaymentService::new(&config);

    let result = service
        .initiate(InitiatePaymentRequest {
            doctor_id,
            patient_email: "ravi@example.com".to_string(),
            patient_name: "Ravi Kumar".to_string(),
            service_type: ServiceType::Consultation,
            service_id: Uuid::new_v4(),
            payment_method: None,
            billing_address: None,
        })
        .await;

    assert_matches!(result, Err(PaymentError::ServiceNotFound));
}

#[tokio::test]
async fn completing_a_payment_marks_the_service_paid_and_credits_the_doctor() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let payment = completed_payment(doctor_id, PaymentState::Pending);

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .and(body_partial_json(json!({ "collection": "payments" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockStoreResponses::find_one(payment_doc(&payment))),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/updateOne"))
        .and(body_partial_json(json!({ "collection": "payments" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::updated(1)))
        .expect(1)
        .mount(&server)
        .await;

    // The linked appointment flips to paid.
    Mock::given(method("POST"))
        .and(path("/action/updateOne"))
        .and(body_partial_json(json!({
            "collection": "appointments",
            "update": { "$set": { "paymentStatus": "paid" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::updated(1)))
        .expect(1)
        .mount(&server)
        .await;

    // The doctor's balances grow by the net amount (500 minus 15%).
    Mock::given(method("POST"))
        .and(path("/action/updateOne"))
        .and(body_partial_json(json!({
            "collection": "doctors",
            "update": { "$inc": { "totalEarnings": 425.0, "pendingWithdrawal": 425.0 } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::updated(1)))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = PaymentService::new(&config);

    let completed = service
        .complete(CompletePaymentRequest {
            transaction_id: payment.transaction_id.clone(),
            payment_id: Some("pay_abc".to_string()),
            signature: Some("sig".to_string()),
            status: None,
        })
        .await
        .unwrap();

    assert_eq!(completed.status, PaymentState::Completed);
    assert!(completed.payment_date.is_some());
}

#[tokio::test]
async fn refund_requires_a_completed_payment() {
    let server = MockServer::start().await;
    let payment = completed_payment(Uuid::new_v4(), PaymentState::Pending);

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockStoreResponses::find_one(payment_doc(&payment))),
        )
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = PaymentService::new(&config);

    let result = service
        .refund(&payment.transaction_id, RefundRequest {
            amount: None,
            reason: None,
            initiated_by: None,
        })
        .await;

    assert_matches!(result, Err(PaymentError::NotRefundable));
}

#[tokio::test]
async fn refund_cannot_exceed_the_net_amount() {
    let server = MockServer::start().await;
    let payment = completed_payment(Uuid::new_v4(), PaymentState::Completed);

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockStoreResponses::find_one(payment_doc(&payment))),
        )
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = PaymentService::new(&config);

    let result = service
        .refund(&payment.transaction_id, RefundRequest {
            amount: Some(600.0),
            reason: None,
            initiated_by: None,
        })
        .await;

    assert_matches!(result, Err(PaymentError::RefundExceedsNet));
}

#[tokio::test]
async fn full_refund_flips_the_payment_to_refunded() {
    let server = MockServer::start().await;
    let payment = completed_payment(Uuid::new_v4(), PaymentState::Completed);

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockStoreResponses::find_one(payment_doc(&payment))),
        )
        .mount(&server)
        .await;

    // One $push for the initiated refund, one $set to settle it.
    Mock::given(method("POST"))
        .and(path("/action/updateOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::updated(1)))
        .expect(2)
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = PaymentService::new(&config);

    let (refunded, refund) = service
        .refund(&payment.transaction_id, RefundRequest {
            amount: None,
            reason: None,
            initiated_by: None,
        })
        .await
        .unwrap();

    assert_eq!(refunded.status, PaymentState::Refunded);
    assert_eq!(refund.amount, 540.0);
    assert!(refund.gateway_refund_id.as_deref().unwrap().starts_with("ref_"));
    assert_eq!(refunded.net_payment_amount(), 0.0);
}

#[tokio::test]
async fn withdrawal_cannot_exceed_the_pending_balance() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    let mut doctor = MockStoreResponses::doctor(&doctor_id.to_string());
    doctor["pendingWithdrawal"] = json!(100.0);

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(doctor)))
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = EarningsService::new(&config);

    let result = service
        .withdraw(doctor_id, WithdrawRequest {
            amount: 500.0,
            bank_details: None,
        })
        .await;

    assert_matches!(result, Err(PaymentError::WithdrawalExceedsBalance));
}

#[tokio::test]
async fn withdrawal_decrements_the_pending_balance() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    let mut doctor = MockStoreResponses::doctor(&doctor_id.to_string());
    doctor["pendingWithdrawal"] = json!(1000.0);

    Mock::given(method("POST"))
        .and(path("/action/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::find_one(doctor)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/action/updateOne"))
        .and(body_partial_json(json!({
            "collection": "doctors",
            "update": { "$inc": { "pendingWithdrawal": -400.0 } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockStoreResponses::updated(1)))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    let service = EarningsService::new(&config);

    let receipt = service
        .withdraw(doctor_id, WithdrawRequest {
            amount: 400.0,
            bank_details: None,
        })
        .await
        .unwrap();

    assert!(receipt.withdrawal_id.starts_with("WD_"));
    assert_eq!(receipt.remaining_balance, 600.0);
}
