use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::DocumentStore;
use shared_utils::jwt::issue_token;
use shared_utils::validation::{is_valid_email, is_valid_phone};

use crate::models::{Doctor, DoctorError, LoginRequest, RegisterDoctorRequest, SUPPORTED_LANGUAGES};
use crate::services::password::{hash_password, verify_password};

const TOKEN_EXPIRE_DAYS: i64 = 7;

pub struct RegistrationService {
    store: DocumentStore,
    jwt_secret: String,
}

impl RegistrationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: DocumentStore::new(config),
            jwt_secret: config.jwt_secret.clone(),
        }
    }

    /// Register a new doctor and issue a session token.
    pub async fn register(
        &self,
        request: RegisterDoctorRequest,
    ) -> Result<(Doctor, String), DoctorError> {
        debug!("Registering doctor: {}", request.email);

        self.validate_registration(&request)?;

        let email = request.email.trim().to_lowercase();
        let license = request.medical_license_number.trim().to_string();

        // Duplicate email or license check. Query-then-insert, the same as the
        // slot booking path; the store enforces no uniqueness.
        let existing = self
            .store
            .find_one(
                "doctors",
                json!({ "$or": [
                    { "email": email },
                    { "medicalLicenseNumber": license }
                ]}),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        if existing.is_some() {
            return Err(DoctorError::AlreadyExists);
        }

        let now = Utc::now();
        let mut doctor = Doctor {
            id: Uuid::new_v4(),
            full_name: request.full_name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            phone: request.phone.trim().to_string(),
            medical_license_number: request.medical_license_number.trim().to_string(),
            specialization: request.specialization,
            experience: request.experience,
            qualification: request.qualification.trim().to_string(),
            registration_body: request.registration_body.trim().to_string(),
            clinic_name: None,
            clinic_address: None,
            consultation_fee: request.consultation_fee,
            languages: request
                .languages
                .unwrap_or_else(|| vec!["Hindi".to_string(), "English".to_string()]),
            is_verified: false,
            is_active: true,
            profile_complete: false,
            availability: Vec::new(),
            profile_photo: String::new(),
            bio: None,
            total_earnings: 0.0,
            pending_withdrawal: 0.0,
            bank_details: None,
            total_consultations: 0,
            rating: 0.0,
            review_count: 0,
            joined_at: now,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        doctor.profile_complete = doctor.check_profile_complete();

        let password_hash = hash_password(&request.password)
            .map_err(|e| DoctorError::Database(format!("Failed to hash password: {}", e)))?;

        let mut document = serde_json::to_value(&doctor)
            .map_err(|e| DoctorError::Database(e.to_string()))?;
        if let Some(map) = document.as_object_mut() {
            map.insert("password".to_string(), json!(password_hash));
        }

        self.store
            .insert_one("doctors", document)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let token = issue_token(
            &doctor.id.to_string(),
            &doctor.email,
            &self.jwt_secret,
            TOKEN_EXPIRE_DAYS,
        )
        .map_err(DoctorError::Database)?;

        info!("Doctor registered successfully: {}", doctor.id);
        Ok((doctor, token))
    }

    /// Verify credentials, stamp the last login time, and issue a token.
    pub async fn login(&self, request: LoginRequest) -> Result<(Doctor, String), DoctorError> {
        let email = request.email.trim().to_lowercase();
        debug!("Login attempt for: {}", email);

        let document = self
            .store
            .find_one("doctors", json!({ "email": email }))
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?
            .ok_or(DoctorError::InvalidCredentials)?;

        let password_hash = document["password"]
            .as_str()
            .ok_or(DoctorError::InvalidCredentials)?;

        let valid = verify_password(&request.password, password_hash)
            .map_err(|e| DoctorError::Database(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(DoctorError::InvalidCredentials);
        }

        let mut doctor: Doctor = serde_json::from_value(document)
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let now = Utc::now();
        self.store
            .update_one(
                "doctors",
                json!({ "id": doctor.id }),
                json!({ "$set": { "lastLoginAt": now, "updatedAt": now } }),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;
        doctor.last_login_at = Some(now);

        let token = issue_token(
            &doctor.id.to_string(),
            &doctor.email,
            &self.jwt_secret,
            TOKEN_EXPIRE_DAYS,
        )
        .map_err(DoctorError::Database)?;

        info!("Doctor logged in: {}", doctor.id);
        Ok((doctor, token))
    }

    fn validate_registration(&self, request: &RegisterDoctorRequest) -> Result<(), DoctorError> {
        if request.full_name.trim().is_empty() {
            return Err(DoctorError::ValidationError("Full name is required".to_string()));
        }
        if request.full_name.len() > 100 {
            return Err(DoctorError::ValidationError(
                "Name cannot exceed 100 characters".to_string(),
            ));
        }
        if !is_valid_email(&request.email) {
            return Err(DoctorError::ValidationError(
                "Please provide a valid email".to_string(),
            ));
        }
        if !is_valid_phone(request.phone.trim()) {
            return Err(DoctorError::ValidationError(
                "Please provide a valid phone number".to_string(),
            ));
        }
        if request.password.len() < 6 {
            return Err(DoctorError::ValidationError(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        if request.medical_license_number.trim().is_empty() {
            return Err(DoctorError::ValidationError(
                "Medical license number is required".to_string(),
            ));
        }
        if request.experience < 0 {
            return Err(DoctorError::ValidationError(
                "Experience cannot be negative".to_string(),
            ));
        }
        if request.qualification.trim().is_empty() {
            return Err(DoctorError::ValidationError(
                "Qualification is required".to_string(),
            ));
        }
        if request.registration_body.trim().is_empty() {
            return Err(DoctorError::ValidationError(
                "Registration body is required".to_string(),
            ));
        }
        if request.consultation_fee < 0.0 {
            return Err(DoctorError::ValidationError("Fee cannot be negative".to_string()));
        }
        if let Some(languages) = &request.languages {
            for language in languages {
                if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
                    return Err(DoctorError::ValidationError(format!(
                        "Unsupported language: {}",
                        language
                    )));
                }
            }
        }

        Ok(())
    }
}
