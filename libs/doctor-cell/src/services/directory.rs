use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::DocumentStore;

use crate::models::{
    Doctor, DoctorError, DoctorListFilters, UpdateDoctorRequest, SUPPORTED_LANGUAGES, WEEKDAYS,
};

pub struct DirectoryService {
    store: DocumentStore,
}

impl DirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: DocumentStore::new(config),
        }
    }

    /// List verified, active doctors with directory filters.
    pub async fn list_doctors(
        &self,
        filters: DoctorListFilters,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<Doctor>, i64), DoctorError> {
        debug!("Listing doctors with filters: {:?}", filters);

        let mut filter = Map::new();
        filter.insert("isVerified".to_string(), json!(true));
        filter.insert("isActive".to_string(), json!(true));

        if let Some(specialization) = &filters.specialization {
            filter.insert("specialization".to_string(), json!(specialization));
        }
        if let Some(city) = &filters.city {
            filter.insert(
                "clinicAddress.city".to_string(),
                json!({ "$regex": city, "$options": "i" }),
            );
        }
        if filters.min_fee.is_some() || filters.max_fee.is_some() {
            let mut range = Map::new();
            if let Some(min_fee) = filters.min_fee {
                range.insert("$gte".to_string(), json!(min_fee));
            }
            if let Some(max_fee) = filters.max_fee {
                range.insert("$lte".to_string(), json!(max_fee));
            }
            filter.insert("consultationFee".to_string(), Value::Object(range));
        }
        if let Some(language) = &filters.language {
            filter.insert("languages".to_string(), json!(language));
        }

        let sort = match filters.sort_by.as_deref() {
            Some("experience") => json!({ "experience": -1 }),
            Some("fee-low") => json!({ "consultationFee": 1 }),
            Some("fee-high") => json!({ "consultationFee": -1 }),
            _ => json!({ "rating": -1, "reviewCount": -1 }),
        };

        let filter = Value::Object(filter);
        let documents = self
            .store
            .find("doctors", filter.clone(), Some(sort), Some(limit), Some(skip))
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let total = self
            .store
            .count("doctors", filter)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let doctors = parse_doctors(documents)?;
        Ok((doctors, total))
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        let document = self
            .store
            .find_one("doctors", json!({ "id": doctor_id }))
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?
            .ok_or(DoctorError::NotFound)?;

        serde_json::from_value(document).map_err(|e| DoctorError::Database(e.to_string()))
    }

    /// Case-insensitive free-text search over the directory.
    pub async fn search_doctors(
        &self,
        query: &str,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<Doctor>, i64), DoctorError> {
        debug!("Searching doctors for: {}", query);

        let filter = json!({
            "isVerified": true,
            "isActive": true,
            "$or": [
                { "fullName": { "$regex": query, "$options": "i" } },
                { "specialization": { "$regex": query, "$options": "i" } },
                { "qualification": { "$regex": query, "$options": "i" } },
                { "clinicAddress.city": { "$regex": query, "$options": "i" } },
                { "languages": { "$regex": query, "$options": "i" } }
            ]
        });

        let documents = self
            .store
            .find(
                "doctors",
                filter.clone(),
                Some(json!({ "rating": -1, "reviewCount": -1 })),
                Some(limit),
                Some(skip),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let total = self
            .store
            .count("doctors", filter)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let doctors = parse_doctors(documents)?;
        Ok((doctors, total))
    }

    /// Platform-wide directory statistics over active doctors.
    pub async fn stats_summary(&self) -> Result<Value, DoctorError> {
        let pipeline = json!([
            { "$match": { "isActive": true } },
            { "$group": {
                "_id": null,
                "totalDoctors": { "$sum": 1 },
                "verifiedDoctors": {
                    "$sum": { "$cond": [{ "$eq": ["$isVerified", true] }, 1, 0] }
                },
                "averageExperience": { "$avg": "$experience" },
                "averageRating": { "$avg": "$rating" },
                "totalConsultations": { "$sum": "$totalConsultations" },
                "specializations": { "$addToSet": "$specialization" }
            }}
        ]);

        let results = self
            .store
            .aggregate("doctors", pipeline)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let mut summary = results.into_iter().next().unwrap_or_else(|| {
            json!({
                "totalDoctors": 0,
                "verifiedDoctors": 0,
                "averageExperience": 0,
                "averageRating": 0,
                "totalConsultations": 0,
                "specializations": []
            })
        });
        if let Some(map) = summary.as_object_mut() {
            map.remove("_id");
        }

        Ok(summary)
    }

    /// Apply a partial profile update and recompute profile completeness.
    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor profile: {}", doctor_id);

        self.validate_update(&request)?;

        let mut update = Map::new();
        if let Some(full_name) = request.full_name {
            update.insert("fullName".to_string(), json!(full_name.trim()));
        }
        if let Some(phone) = request.phone {
            update.insert("phone".to_string(), json!(phone.trim()));
        }
        if let Some(bio) = request.bio {
            update.insert("bio".to_string(), json!(bio));
        }
        if let Some(qualification) = request.qualification {
            update.insert("qualification".to_string(), json!(qualification.trim()));
        }
        if let Some(clinic_name) = request.clinic_name {
            update.insert("clinicName".to_string(), json!(clinic_name.trim()));
        }
        if let Some(clinic_address) = request.clinic_address {
            update.insert("clinicAddress".to_string(), json!(clinic_address));
        }
        if let Some(fee) = request.consultation_fee {
            update.insert("consultationFee".to_string(), json!(fee));
        }
        if let Some(languages) = request.languages {
            update.insert("languages".to_string(), json!(languages));
        }
        if let Some(availability) = request.availability {
            update.insert("availability".to_string(), json!(availability));
        }
        if let Some(bank_details) = request.bank_details {
            update.insert("bankDetails".to_string(), json!(bank_details));
        }
        if let Some(profile_photo) = request.profile_photo {
            update.insert("profilePhoto".to_string(), json!(profile_photo));
        }
        if let Some(is_active) = request.is_active {
            update.insert("isActive".to_string(), json!(is_active));
        }
        update.insert("updatedAt".to_string(), json!(Utc::now()));

        let modified = self
            .store
            .update_one(
                "doctors",
                json!({ "id": doctor_id }),
                json!({ "$set": Value::Object(update) }),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        if modified == 0 {
            return Err(DoctorError::NotFound);
        }

        let mut doctor = self.get_doctor(doctor_id).await?;

        let complete = doctor.check_profile_complete();
        if complete != doctor.profile_complete {
            self.store
                .update_one(
                    "doctors",
                    json!({ "id": doctor_id }),
                    json!({ "$set": { "profileComplete": complete } }),
                )
                .await
                .map_err(|e| DoctorError::Database(e.to_string()))?;
            doctor.profile_complete = complete;
        }

        Ok(doctor)
    }

    fn validate_update(&self, request: &UpdateDoctorRequest) -> Result<(), DoctorError> {
        if let Some(full_name) = &request.full_name {
            if full_name.trim().is_empty() || full_name.len() > 100 {
                return Err(DoctorError::ValidationError(
                    "Name must be between 1 and 100 characters".to_string(),
                ));
            }
        }
        if let Some(phone) = &request.phone {
            if !shared_utils::validation::is_valid_phone(phone.trim()) {
                return Err(DoctorError::ValidationError(
                    "Please provide a valid phone number".to_string(),
                ));
            }
        }
        if let Some(bio) = &request.bio {
            if bio.len() > 500 {
                return Err(DoctorError::ValidationError(
                    "Bio cannot exceed 500 characters".to_string(),
                ));
            }
        }
        if let Some(fee) = request.consultation_fee {
            if fee < 0.0 {
                return Err(DoctorError::ValidationError("Fee cannot be negative".to_string()));
            }
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
        if let Some(availability) = &request.availability {
            for day in availability {
                if !WEEKDAYS.contains(&day.day.as_str()) {
                    return Err(DoctorError::ValidationError(format!(
                        "Invalid availability day: {}",
                        day.day
                    )));
                }
            }
        }

        Ok(())
    }
}

fn parse_doctors(documents: Vec<Value>) -> Result<Vec<Doctor>, DoctorError> {
    documents
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(|e| DoctorError::Database(e.to_string())))
        .collect()
}
