use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::api::{success, success_with_message, PageQuery, Pagination};
use shared_models::error::AppError;

use crate::models::{
    CompletePaymentRequest, DoctorPaymentsQuery, EarningsQuery, InitiatePaymentRequest,
    RefundRequest, WithdrawRequest,
};
use crate::services::{earnings::EarningsService, payment::PaymentService};

#[axum::debug_handler]
pub async fn initiate_payment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = PaymentService::new(&state);

    let initiated = service.initiate(request).await?;

    Ok((
        StatusCode::CREATED,
        success_with_message(
            "Payment initiated successfully",
            json!({
                "payment": {
                    "transactionId": initiated.payment.transaction_id,
                    "orderId": initiated.payment.order_id,
                    "amount": initiated.payment.amount,
                    "currency": initiated.payment.currency,
                    "status": initiated.payment.status,
                },
                "gatewayResponse": initiated.gateway_response,
                "breakdown": initiated.breakdown
            }),
        ),
    ))
}

#[axum::debug_handler]
pub async fn complete_payment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CompletePaymentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PaymentService::new(&state);

    let payment = service.complete(request).await?;

    Ok(success_with_message(
        "Payment completed successfully",
        json!({ "payment": payment }),
    ))
}

#[axum::debug_handler]
pub async fn get_payment(
    State(state): State<Arc<AppConfig>>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = PaymentService::new(&state);

    let payment = service.get_by_transaction(&transaction_id).await?;

    Ok(success(json!({ "payment": payment })))
}

#[axum::debug_handler]
pub async fn get_doctor_payments(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
    Query(query): Query<DoctorPaymentsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PaymentService::new(&state);

    let (payments, total) = service
        .list_for_doctor(doctor_id, query, page.limit(), page.skip())
        .await?;

    Ok(success(json!({
        "payments": payments,
        "pagination": Pagination::new(page.page(), page.limit(), total)
    })))
}

#[axum::debug_handler]
pub async fn get_patient_payments(
    State(state): State<Arc<AppConfig>>,
    Path(email): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PaymentService::new(&state);

    let (payments, total) = service
        .list_for_patient(&email, page.limit(), page.skip())
        .await?;

    Ok(success(json!({
        "payments": payments,
        "pagination": Pagination::new(page.page(), page.limit(), total)
    })))
}

#[axum::debug_handler]
pub async fn refund_payment(
    State(state): State<Arc<AppConfig>>,
    Path(transaction_id): Path<String>,
    Json(request): Json<RefundRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PaymentService::new(&state);

    let reason = request.reason;
    let (payment, refund) = service.refund(&transaction_id, request).await?;

    Ok(success_with_message(
        "Refund processed successfully",
        json!({
            "refund": {
                "amount": refund.amount,
                "refundId": refund.gateway_refund_id,
                "status": refund.status,
                "reason": reason
            },
            "payment": payment
        }),
    ))
}

#[axum::debug_handler]
pub async fn doctor_earnings(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<EarningsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = EarningsService::new(&state);

    let summary = service.earnings_summary(doctor_id, query).await?;

    Ok(success(summary))
}

#[axum::debug_handler]
pub async fn request_withdrawal(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<Value>, AppError> {
    let service = EarningsService::new(&state);

    let receipt = service.withdraw(doctor_id, request).await?;

    Ok(success_with_message(
        "Withdrawal request processed successfully",
        json!({
            "withdrawalId": receipt.withdrawal_id,
            "amount": receipt.amount,
            "status": "processed",
            "processedAt": receipt.processed_at,
            "remainingBalance": receipt.remaining_balance
        }),
    ))
}
