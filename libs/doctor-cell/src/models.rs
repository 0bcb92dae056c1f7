use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use shared_models::error::AppError;

// ==============================================================================
// CORE DOCTOR MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Specialization {
    Ayurveda,
    Panchakarma,
    Rasayana,
    Kayachikitsa,
    Shalya,
    Shalakya,
    Kaumarbhritya,
    Agadtantra,
    Bhutavidya,
    #[serde(rename = "General Ayurveda")]
    GeneralAyurveda,
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specialization::Ayurveda => write!(f, "Ayurveda"),
            Specialization::Panchakarma => write!(f, "Panchakarma"),
            Specialization::Rasayana => write!(f, "Rasayana"),
            Specialization::Kayachikitsa => write!(f, "Kayachikitsa"),
            Specialization::Shalya => write!(f, "Shalya"),
            Specialization::Shalakya => write!(f, "Shalakya"),
            Specialization::Kaumarbhritya => write!(f, "Kaumarbhritya"),
            Specialization::Agadtantra => write!(f, "Agadtantra"),
            Specialization::Bhutavidya => write!(f, "Bhutavidya"),
            Specialization::GeneralAyurveda => write!(f, "General Ayurveda"),
        }
    }
}

pub const SUPPORTED_LANGUAGES: [&str; 11] = [
    "Hindi", "English", "Sanskrit", "Marathi", "Tamil", "Telugu", "Bengali", "Gujarati",
    "Kannada", "Malayalam", "Punjabi",
];

pub const WEEKDAYS: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClinicAddress {
    pub street: Option<String>,
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
pub struct BankDetails {
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub bank_name: Option<String>,
    pub account_holder_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub day: String,
    pub time_slots: Vec<TimeSlot>,
}

/// Stored doctor document, minus the password hash (the hash never leaves the
/// registration/login services).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub medical_license_number: String,
    pub specialization: Specialization,
    pub experience: i32,
    pub qualification: String,
    pub registration_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_address: Option<ClinicAddress>,
    pub consultation_fee: f64,
    #[serde(default)]
    pub languages: Vec<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub profile_complete: bool,
    #[serde(default)]
    pub availability: Vec<DayAvailability>,
    #[serde(default)]
    pub profile_photo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub total_earnings: f64,
    #[serde(default)]
    pub pending_withdrawal: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
    #[serde(default)]
    pub total_consultations: i32,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: i32,
    pub joined_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    /// All of the fields a bookable profile needs.
    pub fn check_profile_complete(&self) -> bool {
        !self.full_name.is_empty()
            && !self.email.is_empty()
            && !self.phone.is_empty()
            && !self.medical_license_number.is_empty()
            && !self.qualification.is_empty()
            && self.experience > 0
            && self.consultation_fee > 0.0
    }

    /// Directory listing view: everything except bank details and the
    /// pending-withdrawal balance.
    pub fn directory_view(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Some(map) = value.as_object_mut() {
            map.remove("bankDetails");
            map.remove("pendingWithdrawal");
        }
        value
    }

    /// Public profile view: additionally hides lifetime earnings.
    pub fn public_view(&self) -> Value {
        let mut value = self.directory_view();
        if let Some(map) = value.as_object_mut() {
            map.remove("totalEarnings");
        }
        value
    }

    /// Compact identity block returned from register/login.
    pub fn summary(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "fullName": self.full_name,
            "email": self.email,
            "specialization": self.specialization,
            "isVerified": self.is_verified,
            "profileComplete": self.profile_complete,
            "consultationFee": self.consultation_fee,
            "totalEarnings": self.total_earnings,
        })
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDoctorRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub medical_license_number: String,
    pub specialization: Specialization,
    pub experience: i32,
    pub qualification: String,
    pub registration_body: String,
    pub consultation_fee: f64,
    pub languages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub qualification: Option<String>,
    pub clinic_name: Option<String>,
    pub clinic_address: Option<ClinicAddress>,
    pub consultation_fee: Option<f64>,
    pub languages: Option<Vec<String>>,
    pub availability: Option<Vec<DayAvailability>>,
    pub bank_details: Option<BankDetails>,
    pub profile_photo: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorListFilters {
    pub specialization: Option<Specialization>,
    pub city: Option<String>,
    pub min_fee: Option<f64>,
    pub max_fee: Option<f64>,
    pub language: Option<String>,
    pub sort_by: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(thiserror::Error, Debug)]
pub enum DoctorError {
    #[error("Doctor with this email or license number already exists")]
    AlreadyExists,

    #[error("Doctor not found")]
    NotFound,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::AlreadyExists => AppError::BadRequest(err.to_string()),
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::InvalidCredentials => AppError::Auth(err.to_string()),
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_utils::test_utils::MockStoreResponses;

    #[test]
    fn doctor_deserializes_from_store_document() {
        let doc = MockStoreResponses::doctor(&Uuid::new_v4().to_string());
        let doctor: Doctor = serde_json::from_value(doc).unwrap();

        assert_eq!(doctor.specialization, Specialization::Panchakarma);
        assert_eq!(doctor.availability.len(), 1);
        assert_eq!(doctor.availability[0].time_slots.len(), 2);
    }

    #[test]
    fn profile_complete_requires_experience_and_fee() {
        let doc = MockStoreResponses::doctor(&Uuid::new_v4().to_string());
        let mut doctor: Doctor = serde_json::from_value(doc).unwrap();
        assert!(doctor.check_profile_complete());

        doctor.consultation_fee = 0.0;
        assert!(!doctor.check_profile_complete());

        doctor.consultation_fee = 500.0;
        doctor.experience = 0;
        assert!(!doctor.check_profile_complete());
    }

    #[test]
    fn public_view_strips_financial_fields() {
        let doc = MockStoreResponses::doctor(&Uuid::new_v4().to_string());
        let doctor: Doctor = serde_json::from_value(doc).unwrap();

        let listing = doctor.directory_view();
        assert!(listing.get("pendingWithdrawal").is_none());
        assert!(listing.get("bankDetails").is_none());
        assert!(listing.get("totalEarnings").is_some());

        let public = doctor.public_view();
        assert!(public.get("totalEarnings").is_none());
        assert!(public.get("fullName").is_some());
    }

    #[test]
    fn specialization_round_trips_with_spaces() {
        let value = serde_json::json!("General Ayurveda");
        let spec: Specialization = serde_json::from_value(value).unwrap();
        assert_eq!(spec, Specialization::GeneralAyurveda);
        assert_eq!(spec.to_string(), "General Ayurveda");
    }
}
