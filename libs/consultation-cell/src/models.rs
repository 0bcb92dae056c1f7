use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

// ==============================================================================
// CORE CONSULTATION MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationType {
    Video,
    Audio,
    Chat,
    Phone,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ConsultationStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Dosha constitution used for both prakriti (baseline) and vikriti
/// (current imbalance).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Dosha {
    Vata,
    Pitta,
    Kapha,
    #[serde(rename = "Vata-Pitta")]
    VataPitta,
    #[serde(rename = "Vata-Kapha")]
    VataKapha,
    #[serde(rename = "Pitta-Kapha")]
    PittaKapha,
    Tridosha,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationEntry {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub medicine_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    #[serde(default = "default_instructions")]
    pub instructions: String,
}

fn default_instructions() -> String {
    "Take as prescribed".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_age: Option<i32>,
    pub patient_gender: Gender,
    pub consultation_type: ConsultationType,
    pub consultation_date: DateTime<Utc>,
    pub duration: i32,
    pub chief_complaint: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub current_medications: Vec<MedicationEntry>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prakriti: Option<Dosha>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vikriti: Option<Dosha>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tongue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(default)]
    pub prescriptions: Vec<Prescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_advice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle_recommendations: Option<String>,
    #[serde(default)]
    pub follow_up_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_instructions: Option<String>,
    pub status: ConsultationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub consultation_fee: f64,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_satisfaction: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Consultation {
    /// Minutes between the actual start and end stamps, once both exist.
    pub fn actual_duration(&self) -> Option<i64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => {
                let seconds = (end - start).num_seconds();
                Some((seconds as f64 / 60.0).round() as i64)
            }
            _ => None,
        }
    }

    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "consultationDate": self.consultation_date,
            "consultationType": self.consultation_type,
            "duration": self.actual_duration().unwrap_or(self.duration as i64),
            "status": self.status,
            "consultationFee": self.consultation_fee,
            "diagnosis": self.diagnosis,
            "followUpRequired": self.follow_up_required,
            "meetingId": self.meeting_id,
        })
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsultationRequest {
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub patient_age: Option<i32>,
    pub patient_gender: Gender,
    pub consultation_type: ConsultationType,
    pub consultation_date: DateTime<Utc>,
    pub chief_complaint: String,
    pub symptoms: Option<Vec<String>>,
    pub medical_history: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub current_medications: Option<Vec<MedicationEntry>>,
}

/// Partial consultation update; the status change drives start/end stamping.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConsultationRequest {
    pub status: Option<ConsultationStatus>,
    pub duration: Option<i32>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub doctor_rating: Option<i32>,
    pub doctor_feedback: Option<String>,
    pub patient_satisfaction: Option<i32>,
    pub follow_up_required: Option<bool>,
    pub follow_up_date: Option<NaiveDate>,
    pub follow_up_instructions: Option<String>,
    pub dietary_advice: Option<String>,
    pub lifestyle_recommendations: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionRequest {
    pub prescriptions: Option<Vec<Prescription>>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub dietary_advice: Option<String>,
    pub lifestyle_recommendations: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentRequest {
    pub prakriti: Option<Dosha>,
    pub vikriti: Option<Dosha>,
    pub pulse: Option<String>,
    pub tongue: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorConsultationsQuery {
    pub status: Option<ConsultationStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationStatsQuery {
    pub doctor_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConsultationError {
    #[error("Consultation not found")]
    NotFound,

    #[error("Doctor not found or not available")]
    DoctorNotAvailable,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<ConsultationError> for AppError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::NotFound => AppError::NotFound(err.to_string()),
            ConsultationError::DoctorNotAvailable => AppError::BadRequest(err.to_string()),
            ConsultationError::ValidationError(msg) => AppError::ValidationError(msg),
            ConsultationError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_consultation() -> Consultation {
        let now = Utc.with_ymd_and_hms(2030, 6, 1, 10, 0, 0).unwrap();
        Consultation {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            patient_name: "Meera Nair".to_string(),
            patient_email: "meera@example.com".to_string(),
            patient_phone: "9898989898".to_string(),
            patient_age: Some(29),
            patient_gender: Gender::Female,
            consultation_type: ConsultationType::Video,
            consultation_date: now,
            duration: 30,
            chief_complaint: "Recurring migraines".to_string(),
            symptoms: vec!["headache".to_string()],
            medical_history: None,
            current_medications: vec![],
            allergies: vec![],
            prakriti: None,
            vikriti: None,
            pulse: None,
            tongue: None,
            diagnosis: None,
            treatment: None,
            prescriptions: vec![],
            dietary_advice: None,
            lifestyle_recommendations: None,
            follow_up_required: false,
            follow_up_date: None,
            follow_up_instructions: None,
            status: ConsultationStatus::Scheduled,
            start_time: None,
            end_time: None,
            consultation_fee: 500.0,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            transaction_id: None,
            doctor_rating: None,
            doctor_feedback: None,
            patient_satisfaction: None,
            meeting_id: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn actual_duration_needs_both_stamps() {
        let mut consultation = base_consultation();
        assert_eq!(consultation.actual_duration(), None);

        let start = consultation.consultation_date;
        consultation.start_time = Some(start);
        assert_eq!(consultation.actual_duration(), None);

        consultation.end_time = Some(start + Duration::minutes(42));
        assert_eq!(consultation.actual_duration(), Some(42));
    }

    #[test]
    fn summary_prefers_actual_duration() {
        let mut consultation = base_consultation();
        assert_eq!(consultation.summary()["duration"], 30);

        let start = consultation.consultation_date;
        consultation.start_time = Some(start);
        consultation.end_time = Some(start + Duration::minutes(50));
        assert_eq!(consultation.summary()["duration"], 50);
    }

    #[test]
    fn dosha_serializes_with_hyphenated_pairs() {
        assert_eq!(
            serde_json::to_value(Dosha::VataPitta).unwrap(),
            serde_json::json!("Vata-Pitta")
        );
        let parsed: Dosha = serde_json::from_value(serde_json::json!("Pitta-Kapha")).unwrap();
        assert_eq!(parsed, Dosha::PittaKapha);
    }

    #[test]
    fn prescription_defaults_instructions() {
        let parsed: Prescription = serde_json::from_value(serde_json::json!({
            "medicineName": "Triphala churna",
            "dosage": "1 tsp",
            "frequency": "twice daily",
            "duration": "30 days"
        }))
        .unwrap();
        assert_eq!(parsed.instructions, "Take as prescribed");
    }
}
