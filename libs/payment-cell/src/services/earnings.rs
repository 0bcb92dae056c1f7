use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use doctor_cell::services::directory::DirectoryService;
use shared_config::AppConfig;
use shared_database::DocumentStore;

use crate::models::{EarningsQuery, PaymentError, WithdrawRequest};
use crate::services::payment::random_suffix;

pub struct EarningsService {
    store: DocumentStore,
    directory: DirectoryService,
}

#[derive(Debug)]
pub struct WithdrawalReceipt {
    pub withdrawal_id: String,
    pub amount: f64,
    pub processed_at: DateTime<Utc>,
    pub remaining_balance: f64,
}

impl EarningsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: DocumentStore::new(config),
            directory: DirectoryService::new(config),
        }
    }

    /// Aggregate completed-payment earnings for a doctor over a period
    /// (explicit range, or week/month/year back from now).
    pub async fn earnings_summary(
        &self,
        doctor_id: Uuid,
        query: EarningsQuery,
    ) -> Result<Value, PaymentError> {
        let (start, end) = match (query.start_date, query.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                let end = Utc::now();
                let start = match query.period.as_deref() {
                    Some("week") => end - Duration::weeks(1),
                    Some("year") => end - Duration::days(365),
                    _ => end - Duration::days(30),
                };
                (start, end)
            }
        };

        debug!("Earnings summary for doctor {} from {} to {}", doctor_id, start, end);

        let pipeline = json!([
            { "$match": {
                "doctorId": doctor_id,
                "status": "completed",
                "paymentDate": { "$gte": start, "$lte": end }
            }},
            { "$group": {
                "_id": null,
                "totalGrossEarnings": { "$sum": "$doctorEarning.grossAmount" },
                "totalPlatformCommission": { "$sum": "$doctorEarning.platformCommission" },
                "totalNetEarnings": { "$sum": "$doctorEarning.netAmount" },
                "totalTransactions": { "$sum": 1 },
                "averageTransactionValue": { "$avg": "$amount" }
            }}
        ]);

        let results = self
            .store
            .aggregate("payments", pipeline)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        let mut summary = results.into_iter().next().unwrap_or_else(|| {
            json!({
                "totalGrossEarnings": 0,
                "totalPlatformCommission": 0,
                "totalNetEarnings": 0,
                "totalTransactions": 0,
                "averageTransactionValue": 0
            })
        });

        let pending_pipeline = json!([
            { "$match": {
                "doctorId": doctor_id,
                "status": "completed",
                "settlementStatus": "pending"
            }},
            { "$group": {
                "_id": null,
                "totalPending": { "$sum": "$doctorEarning.netAmount" }
            }}
        ]);

        let pending_results = self
            .store
            .aggregate("payments", pending_pipeline)
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        let pending_settlement = pending_results
            .first()
            .and_then(|doc| doc["totalPending"].as_f64())
            .unwrap_or(0.0);

        if let Some(map) = summary.as_object_mut() {
            map.remove("_id");
            map.insert("pendingSettlement".to_string(), json!(pending_settlement));
        }

        Ok(json!({
            "doctorId": doctor_id,
            "period": { "start": start, "end": end },
            "summary": summary
        }))
    }

    /// Settle part of a doctor's pending balance. The balance decrement is the
    /// only persisted effect; there is no banking integration.
    pub async fn withdraw(
        &self,
        doctor_id: Uuid,
        request: WithdrawRequest,
    ) -> Result<WithdrawalReceipt, PaymentError> {
        if request.amount <= 0.0 {
            return Err(PaymentError::ValidationError(
                "Withdrawal amount must be positive".to_string(),
            ));
        }

        let doctor = self
            .directory
            .get_doctor(doctor_id)
            .await
            .map_err(|_| PaymentError::DoctorNotFound)?;

        if request.amount > doctor.pending_withdrawal {
            return Err(PaymentError::WithdrawalExceedsBalance);
        }

        let now = Utc::now();
        if let Some(bank_details) = &request.bank_details {
            self.store
                .update_one(
                    "doctors",
                    json!({ "id": doctor_id }),
                    json!({ "$set": { "bankDetails": bank_details, "updatedAt": now } }),
                )
                .await
                .map_err(|e| PaymentError::Database(e.to_string()))?;
        }

        self.store
            .update_one(
                "doctors",
                json!({ "id": doctor_id }),
                json!({ "$inc": { "pendingWithdrawal": -request.amount } }),
            )
            .await
            .map_err(|e| PaymentError::Database(e.to_string()))?;

        let withdrawal_id = format!("WD_{}_{}", now.timestamp_millis(), random_suffix(6));
        info!(
            "Withdrawal {} of {} processed for doctor {}",
            withdrawal_id, request.amount, doctor_id
        );

        Ok(WithdrawalReceipt {
            withdrawal_id,
            amount: request.amount,
            processed_at: now,
            remaining_balance: doctor.pending_withdrawal - request.amount,
        })
    }
}
