use chrono::Utc;
use rand::Rng;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::services::directory::DirectoryService;
use shared_config::AppConfig;
use shared_database::DocumentStore;
use shared_utils::validation::is_valid_email;

use crate::models::{
    CompletePaymentRequest, DoctorEarning, DoctorPaymentsQuery, FeeBreakdown, GatewayResponse,
    InitiatePaymentRequest, Payment, PaymentError, PaymentState, PaymentProvider, Refund,
    RefundParty, RefundRequest, RefundStatus, ServiceModel, ServiceType, SettlementStatus,
    DEFAULT_COMMISSION_PERCENTAGE,
};

/// Lowercase alphanumeric suffix for transaction-style identifiers.
pub fn random_suffix(len: usize) -> String {
    const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();

    (0..len)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

pub struct PaymentService {
    store: DocumentStore,
    directory: DirectoryService,
}

#[derive(Debug)]
pub struct InitiatedPayment {
    pub payment: Payment,
    pub gateway_response: Value,
    pub breakdown: Value,
}

impl PaymentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: DocumentStore::new(config),
            directory: DirectoryService::new(config),
        }
    }

    /// Stage a payment: compute the fee/tax breakdown, persist a pending
    /// record, and fabricate a gateway order. No real gateway is called.
    pub async fn initiate(
        &self,
        request: InitiatePaymentRequest,
    ) -> Result<InitiatedPayment, PaymentError> {
        info!(
            "Initiating payment for {:?} {} with doctor {}",
            request.service_type, request.service_id, request.doctor_id
        );

        if !is_valid_email(request.patient_email.trim()) {
            return Err(PaymentError::ValidationError(
                "Please provide a valid patient email".to_string(),
            ));
        }

        let doctor = self
            .directory
            .get_doctor(request.doctor_id)
            .await
            .map_err(|_| PaymentError::DoctorNotFound)?;

        let service_model = match request.service_type {
            ServiceType::Consultation => ServiceModel::Consultation,
            ServiceType::Appointment => ServiceModel::Appointment,
        };

        let service = self
            .store
            .find_one(
                service_model.collection(),
                json!({ "id": request.service_id }),
            )
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?
            .ok_or(PaymentError::ServiceNotFound)?;

        let consultation_fee = service["consultationFee"]
            .as_f64()
            .unwrap_or(doctor.consultation_fee);

        let breakdown = FeeBreakdown::compute(consultation_fee);
        let now = Utc::now();
        let transaction_id = format!("TXN_{}_{}", now.timestamp_millis(), random_suffix(9));
        let order_id = format!("ORD_{}_{}", now.timestamp_millis(), random_suffix(6));

        let payment = Payment {
            id: Uuid::new_v4(),
            transaction_id: transaction_id.clone(),
            order_id: order_id.clone(),
            doctor_id: request.doctor_id,
            patient_email: request.patient_email.trim().to_lowercase(),
            patient_name: request.patient_name.trim().to_string(),
            service_type: request.service_type,
            service_id: request.service_id,
            service_model,
            amount: breakdown.total_amount,
            currency: "INR".to_string(),
            consultation_fee: breakdown.consultation_fee,
            platform_fee: breakdown.platform_fee,
            processing_fee: breakdown.processing_fee,
            taxes: breakdown.taxes(),
            discount_amount: 0.0,
            payment_method: request.payment_method.unwrap_or_default(),
            payment_provider: PaymentProvider::Razorpay,
            status: PaymentState::Pending,
            payment_date: None,
            gateway_response: None,
            refunds: Vec::new(),
            doctor_earning: DoctorEarning::compute(
                consultation_fee,
                DEFAULT_COMMISSION_PERCENTAGE,
            ),
            settlement_status: SettlementStatus::Pending,
            settlement_date: None,
            settlement_id: None,
            billing_address: request.billing_address,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        let document =
            serde_json::to_value(&payment).map_err(|e| PaymentError::Database(e.to_string()))?;
        self.store
            .insert_one("payments", document)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        // Simulated gateway order, shaped like a razorpay response.
        let service_label = match payment.service_type {
            ServiceType::Consultation => "consultation",
            ServiceType::Appointment => "appointment",
        };
        let gateway_response = json!({
            "paymentId": format!("pay_{}", random_suffix(14)),
            "orderId": order_id,
            "status": "created",
            "amount": breakdown.total_amount,
            "currency": "INR",
            "description": format!("{} with Dr. {}", service_label, doctor.full_name),
        });

        let breakdown_value = json!({
            "consultationFee": breakdown.consultation_fee,
            "platformFee": breakdown.platform_fee,
            "processingFee": breakdown.processing_fee,
            "taxes": payment.taxes.clone(),
            "totalAmount": breakdown.total_amount
        });

        info!("Payment {} initiated for {}", payment.transaction_id, payment.amount);
        Ok(InitiatedPayment {
            payment,
            gateway_response,
            breakdown: breakdown_value,
        })
    }

    /// Webhook-style completion. On success the linked service is marked paid
    /// and the doctor's earnings are bumped; the writes are sequential with no
    /// transaction around them.
    pub async fn complete(&self, request: CompletePaymentRequest) -> Result<Payment, PaymentError> {
        let mut payment = self.get_by_transaction(&request.transaction_id).await?;

        let status = request.status.unwrap_or(PaymentState::Completed);
        let now = Utc::now();
        let status_label = serde_json::to_value(status)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string));
        let gateway_response = GatewayResponse {
            payment_id: request.payment_id,
            signature: request.signature,
            status: status_label,
            message: Some("Payment completed successfully".to_string()),
        };

        self.store
            .update_one(
                "payments",
                json!({ "transactionId": request.transaction_id }),
                json!({ "$set": {
                    "status": status,
                    "paymentDate": now,
                    "gatewayResponse": gateway_response.clone(),
                    "updatedAt": now
                }}),
            )
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        payment.status = status;
        payment.payment_date = Some(now);
        payment.gateway_response = Some(gateway_response);
        payment.updated_at = now;

        if status == PaymentState::Completed {
            self.store
                .update_one(
                    payment.service_model.collection(),
                    json!({ "id": payment.service_id }),
                    json!({ "$set": {
                        "paymentStatus": "paid",
                        "transactionId": payment.transaction_id
                    }}),
                )
                .await
                .map_err(|e| PaymentError::Database(e.to_string()))?;

            let net = payment.doctor_earning.net_amount;
            self.store
                .update_one(
                    "doctors",
                    json!({ "id": payment.doctor_id }),
                    json!({ "$inc": {
                        "totalEarnings": net,
                        "pendingWithdrawal": net
                    }}),
                )
                .await
                .map_err(|e| PaymentError::Database(e.to_string()))?;

            info!(
                "Payment {} completed; doctor {} credited {}",
                payment.transaction_id, payment.doctor_id, net
            );
        }

        Ok(payment)
    }

    pub async fn get_by_transaction(&self, transaction_id: &str) -> Result<Payment, PaymentError> {
        let document = self
            .store
            .find_one("payments", json!({ "transactionId": transaction_id }))
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?
            .ok_or(PaymentError::NotFound)?;

        serde_json::from_value(document).map_err(|e| PaymentError::Database(e.to_string()))
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        query: DoctorPaymentsQuery,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<Payment>, i64), PaymentError> {
        debug!("Listing payments for doctor {}", doctor_id);

        let mut filter = Map::new();
        filter.insert("doctorId".to_string(), json!(doctor_id));
        if let Some(status) = query.status {
            filter.insert("status".to_string(), json!(status));
        }
        if query.start_date.is_some() || query.end_date.is_some() {
            let mut range = Map::new();
            if let Some(start) = query.start_date {
                range.insert("$gte".to_string(), json!(start));
            }
            if let Some(end) = query.end_date {
                range.insert("$lte".to_string(), json!(end));
            }
            filter.insert("paymentDate".to_string(), Value::Object(range));
        }

        self.paginated("payments", Value::Object(filter), limit, skip).await
    }

    pub async fn list_for_patient(
        &self,
        email: &str,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<Payment>, i64), PaymentError> {
        let filter = json!({ "patientEmail": email.to_lowercase() });
        self.paginated("payments", filter, limit, skip).await
    }

    /// Append a refund and immediately settle it against the simulated
    /// gateway. Fully refunded payments flip to refunded, anything else to
    /// partially-refunded.
    pub async fn refund(
        &self,
        transaction_id: &str,
        request: RefundRequest,
    ) -> Result<(Payment, Refund), PaymentError> {
        let mut payment = self.get_by_transaction(transaction_id).await?;

        if payment.status != PaymentState::Completed {
            return Err(PaymentError::NotRefundable);
        }

        let refund_amount = request.amount.unwrap_or(payment.amount);
        if refund_amount > payment.net_payment_amount() {
            warn!(
                "Refund of {} rejected for {}: exceeds net amount {}",
                refund_amount,
                transaction_id,
                payment.net_payment_amount()
            );
            return Err(PaymentError::RefundExceedsNet);
        }

        let now = Utc::now();
        let refund = Refund {
            refund_id: None,
            amount: refund_amount,
            reason: request.reason,
            status: RefundStatus::Initiated,
            initiated_by: request.initiated_by.unwrap_or(RefundParty::Admin),
            processed_at: None,
            gateway_refund_id: None,
            created_at: now,
        };

        self.store
            .update_one(
                "payments",
                json!({ "transactionId": transaction_id }),
                json!({ "$push": { "refunds": refund.clone() } }),
            )
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;
        payment.refunds.push(refund);

        // Simulated gateway processing: complete the refund straight away.
        let gateway_refund_id = format!("ref_{}", random_suffix(14));
        let index = payment.refunds.len() - 1;
        payment.refunds[index].status = RefundStatus::Completed;
        payment.refunds[index].processed_at = Some(now);
        payment.refunds[index].gateway_refund_id = Some(gateway_refund_id);

        let new_status = if payment.total_refunded_amount() >= payment.amount {
            PaymentState::Refunded
        } else {
            PaymentState::PartiallyRefunded
        };
        payment.status = new_status;
        payment.updated_at = now;

        self.store
            .update_one(
                "payments",
                json!({ "transactionId": transaction_id }),
                json!({ "$set": {
                    "refunds": &payment.refunds,
                    "status": new_status,
                    "updatedAt": now
                }}),
            )
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        info!("Refund of {} processed for {}", refund_amount, transaction_id);
        let completed_refund = payment.refunds[index].clone();
        Ok((payment, completed_refund))
    }

    async fn paginated(
        &self,
        collection: &str,
        filter: Value,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<Payment>, i64), PaymentError> {
        let documents = self
            .store
            .find(
                collection,
                filter.clone(),
                Some(json!({ "paymentDate": -1 })),
                Some(limit),
                Some(skip),
            )
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        let total = self
            .store
            .count(collection, filter)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        let payments = documents
            .into_iter()
            .map(|doc| {
                serde_json::from_value(doc).map_err(|e| PaymentError::Database(e.to_string()))
            })
            .collect::<Result<Vec<Payment>, _>>()?;

        Ok((payments, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_is_lowercase_alphanumeric() {
        let suffix = random_suffix(9);
        assert_eq!(suffix.len(), 9);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
