use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use doctor_cell::models::BankDetails;
use shared_models::error::AppError;

pub const DEFAULT_COMMISSION_PERCENTAGE: f64 = 15.0;
pub const PLATFORM_FEE_RATE: f64 = 0.05;
pub const PROCESSING_FEE_RATE: f64 = 0.02;
pub const GST_RATE: f64 = 0.18;

// ==============================================================================
// CORE PAYMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Consultation,
    Appointment,
}

/// Collection tag for the polymorphic service reference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServiceModel {
    Consultation,
    Appointment,
}

impl ServiceModel {
    pub fn collection(&self) -> &'static str {
        match self {
            ServiceModel::Consultation => "consultations",
            ServiceModel::Appointment => "appointments",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Card,
    Upi,
    Netbanking,
    Wallet,
    Cash,
    BankTransfer,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Card
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Razorpay,
    Paytm,
    Phonepe,
    Gpay,
    Stripe,
    Paypal,
    Manual,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentState {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Refunded,
    PartiallyRefunded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RefundReason {
    Cancellation,
    TechnicalIssue,
    DoctorUnavailable,
    PatientRequest,
    QualityIssue,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Initiated,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RefundParty {
    Patient,
    Doctor,
    Admin,
    System,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Processing,
    Settled,
    Hold,
    Failed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxBreakdown {
    #[serde(default)]
    pub gst: f64,
    #[serde(default)]
    pub cgst: f64,
    #[serde(default)]
    pub sgst: f64,
    #[serde(default)]
    pub igst: f64,
}

/// Gross fee, platform/processing fees, and GST on the platform fee,
/// rounded to whole rupees the way invoices are issued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeBreakdown {
    pub consultation_fee: f64,
    pub platform_fee: f64,
    pub processing_fee: f64,
    pub gst: f64,
    pub total_amount: f64,
}

impl FeeBreakdown {
    pub fn compute(consultation_fee: f64) -> Self {
        let platform_fee = (consultation_fee * PLATFORM_FEE_RATE).round();
        let processing_fee = (consultation_fee * PROCESSING_FEE_RATE).round();
        let gst = (platform_fee * GST_RATE).round();
        let total_amount = consultation_fee + platform_fee + processing_fee + gst;

        Self {
            consultation_fee,
            platform_fee,
            processing_fee,
            gst,
            total_amount,
        }
    }

    pub fn taxes(&self) -> TaxBreakdown {
        TaxBreakdown {
            gst: self.gst,
            cgst: (self.gst / 2.0).round(),
            sgst: (self.gst / 2.0).round(),
            igst: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorEarning {
    pub gross_amount: f64,
    pub platform_commission: f64,
    pub net_amount: f64,
    pub commission_percentage: f64,
}

impl DoctorEarning {
    pub fn compute(consultation_fee: f64, commission_percentage: f64) -> Self {
        let platform_commission = consultation_fee * commission_percentage / 100.0;

        Self {
            gross_amount: consultation_fee,
            platform_commission,
            net_amount: consultation_fee - platform_commission,
            commission_percentage,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_id: Option<String>,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RefundReason>,
    pub status: RefundStatus,
    pub initiated_by: RefundParty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_refund_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BillingAddress {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "India".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub transaction_id: String,
    pub order_id: String,
    pub doctor_id: Uuid,
    pub patient_email: String,
    pub patient_name: String,
    pub service_type: ServiceType,
    pub service_id: Uuid,
    pub service_model: ServiceModel,
    pub amount: f64,
    pub currency: String,
    pub consultation_fee: f64,
    #[serde(default)]
    pub platform_fee: f64,
    #[serde(default)]
    pub processing_fee: f64,
    #[serde(default)]
    pub taxes: TaxBreakdown,
    #[serde(default)]
    pub discount_amount: f64,
    pub payment_method: PaymentMethod,
    pub payment_provider: PaymentProvider,
    pub status: PaymentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_response: Option<GatewayResponse>,
    #[serde(default)]
    pub refunds: Vec<Refund>,
    pub doctor_earning: DoctorEarning,
    pub settlement_status: SettlementStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<BillingAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Sum of refunds that have actually gone through.
    pub fn total_refunded_amount(&self) -> f64 {
        self.refunds
            .iter()
            .filter(|refund| refund.status == RefundStatus::Completed)
            .map(|refund| refund.amount)
            .sum()
    }

    pub fn net_payment_amount(&self) -> f64 {
        self.amount - self.total_refunded_amount()
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiatePaymentRequest {
    pub doctor_id: Uuid,
    pub patient_email: String,
    pub patient_name: String,
    pub service_type: ServiceType,
    pub service_id: Uuid,
    pub payment_method: Option<PaymentMethod>,
    pub billing_address: Option<BillingAddress>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaymentRequest {
    pub transaction_id: String,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    pub status: Option<PaymentState>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub amount: Option<f64>,
    pub reason: Option<RefundReason>,
    pub initiated_by: Option<RefundParty>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorPaymentsQuery {
    pub status: Option<PaymentState>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub period: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub amount: f64,
    pub bank_details: Option<BankDetails>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(thiserror::Error, Debug)]
pub enum PaymentError {
    #[error("Payment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Service not found")]
    ServiceNotFound,

    #[error("Cannot refund a payment that is not completed")]
    NotRefundable,

    #[error("Refund amount cannot exceed the net payment amount")]
    RefundExceedsNet,

    #[error("Withdrawal amount exceeds pending balance")]
    WithdrawalExceedsBalance,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotFound | PaymentError::DoctorNotFound | PaymentError::ServiceNotFound => {
                AppError::NotFound(err.to_string())
            }
            PaymentError::NotRefundable
            | PaymentError::RefundExceedsNet
            | PaymentError::WithdrawalExceedsBalance => AppError::BadRequest(err.to_string()),
            PaymentError::ValidationError(msg) => AppError::ValidationError(msg),
            PaymentError::Database(msg) => AppError::Database(msg),
        }
    }
}
