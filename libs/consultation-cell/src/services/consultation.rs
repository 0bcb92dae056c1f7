use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use doctor_cell::services::directory::DirectoryService;
use shared_config::AppConfig;
use shared_database::DocumentStore;
use shared_utils::validation::{is_valid_email, is_valid_phone};

use crate::models::{
    AssessmentRequest, Consultation, ConsultationError, ConsultationStatsQuery, ConsultationStatus,
    ConsultationType, CreateConsultationRequest, DoctorConsultationsQuery, PaymentStatus,
    PrescriptionRequest, UpdateConsultationRequest,
};

pub struct ConsultationService {
    store: DocumentStore,
    directory: DirectoryService,
}

impl ConsultationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: DocumentStore::new(config),
            directory: DirectoryService::new(config),
        }
    }

    pub async fn create_consultation(
        &self,
        request: CreateConsultationRequest,
    ) -> Result<Consultation, ConsultationError> {
        info!("Scheduling consultation with doctor {}", request.doctor_id);

        self.validate_create(&request)?;

        let doctor = self
            .directory
            .get_doctor(request.doctor_id)
            .await
            .map_err(|_| ConsultationError::DoctorNotAvailable)?;

        if !doctor.is_active || !doctor.is_verified {
            return Err(ConsultationError::DoctorNotAvailable);
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut consultation = Consultation {
            id,
            doctor_id: request.doctor_id,
            patient_name: request.patient_name.trim().to_string(),
            patient_email: request.patient_email.trim().to_lowercase(),
            patient_phone: request.patient_phone.trim().to_string(),
            patient_age: request.patient_age,
            patient_gender: request.patient_gender,
            consultation_type: request.consultation_type,
            consultation_date: request.consultation_date,
            duration: 30,
            chief_complaint: request.chief_complaint.trim().to_string(),
            symptoms: request.symptoms.unwrap_or_default(),
            medical_history: request.medical_history,
            current_medications: request.current_medications.unwrap_or_default(),
            allergies: request.allergies.unwrap_or_default(),
            prakriti: None,
            vikriti: None,
            pulse: None,
            tongue: None,
            diagnosis: None,
            treatment: None,
            prescriptions: Vec::new(),
            dietary_advice: None,
            lifestyle_recommendations: None,
            follow_up_required: false,
            follow_up_date: None,
            follow_up_instructions: None,
            status: ConsultationStatus::Scheduled,
            start_time: None,
            end_time: None,
            consultation_fee: doctor.consultation_fee,
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
        };

        if matches!(
            consultation.consultation_type,
            ConsultationType::Video | ConsultationType::Audio
        ) {
            consultation.meeting_id = Some(format!("amrutam-{}", &id.simple().to_string()[..8]));
        }

        let document = serde_json::to_value(&consultation)
            .map_err(|e| ConsultationError::Database(e.to_string()))?;
        self.store
            .insert_one("consultations", document)
            .await
            .map_err(|e| ConsultationError::Database(e.to_string()))?;

        info!("Consultation {} scheduled with doctor {}", consultation.id, doctor.id);
        Ok(consultation)
    }

    pub async fn get_consultation(
        &self,
        consultation_id: Uuid,
    ) -> Result<Consultation, ConsultationError> {
        let document = self
            .store
            .find_one("consultations", json!({ "id": consultation_id }))
            .await
            .map_err(|e| ConsultationError::Database(e.to_string()))?
            .ok_or(ConsultationError::NotFound)?;

        serde_json::from_value(document).map_err(|e| ConsultationError::Database(e.to_string()))
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        query: DoctorConsultationsQuery,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<Consultation>, i64), ConsultationError> {
        debug!("Listing consultations for doctor {}", doctor_id);

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
            filter.insert("consultationDate".to_string(), Value::Object(range));
        }

        let sort = match query.sort_by.as_deref() {
            Some("date-asc") => json!({ "consultationDate": 1 }),
            Some("status") => json!({ "status": 1, "consultationDate": -1 }),
            _ => json!({ "consultationDate": -1 }),
        };

        let filter = Value::Object(filter);
        let documents = self
            .store
            .find("consultations", filter.clone(), Some(sort), Some(limit), Some(skip))
            .await
            .map_err(|e| ConsultationError::Database(e.to_string()))?;

        let total = self
            .store
            .count("consultations", filter)
            .await
            .map_err(|e| ConsultationError::Database(e.to_string()))?;

        let consultations = documents
            .into_iter()
            .map(|doc| {
                serde_json::from_value(doc).map_err(|e| ConsultationError::Database(e.to_string()))
            })
            .collect::<Result<Vec<Consultation>, _>>()?;

        Ok((consultations, total))
    }

    /// Partial update. Moving to in-progress stamps the start time; completing
    /// stamps the end time and bumps the doctor's consultation counter in a
    /// second, separate write.
    pub async fn update_consultation(
        &self,
        consultation_id: Uuid,
        request: UpdateConsultationRequest,
    ) -> Result<Consultation, ConsultationError> {
        let consultation = self.get_consultation(consultation_id).await?;

        let now = Utc::now();
        let mut update = Map::new();

        if let Some(status) = request.status {
            update.insert("status".to_string(), json!(status));

            if status == ConsultationStatus::InProgress && consultation.start_time.is_none() {
                update.insert("startTime".to_string(), json!(now));
            }
            if status == ConsultationStatus::Completed && consultation.end_time.is_none() {
                update.insert("endTime".to_string(), json!(now));
            }
        }
        if let Some(duration) = request.duration {
            update.insert("duration".to_string(), json!(duration));
        }
        if let Some(diagnosis) = request.diagnosis {
            update.insert("diagnosis".to_string(), json!(diagnosis));
        }
        if let Some(treatment) = request.treatment {
            update.insert("treatment".to_string(), json!(treatment));
        }
        if let Some(notes) = request.notes {
            update.insert("notes".to_string(), json!(notes));
        }
        if let Some(rating) = request.doctor_rating {
            if !(1..=5).contains(&rating) {
                return Err(ConsultationError::ValidationError(
                    "Rating must be between 1 and 5".to_string(),
                ));
            }
            update.insert("doctorRating".to_string(), json!(rating));
        }
        if let Some(feedback) = request.doctor_feedback {
            update.insert("doctorFeedback".to_string(), json!(feedback));
        }
        if let Some(satisfaction) = request.patient_satisfaction {
            update.insert("patientSatisfaction".to_string(), json!(satisfaction));
        }
        if let Some(required) = request.follow_up_required {
            update.insert("followUpRequired".to_string(), json!(required));
        }
        if let Some(date) = request.follow_up_date {
            update.insert("followUpDate".to_string(), json!(date));
        }
        if let Some(instructions) = request.follow_up_instructions {
            update.insert("followUpInstructions".to_string(), json!(instructions));
        }
        if let Some(advice) = request.dietary_advice {
            update.insert("dietaryAdvice".to_string(), json!(advice));
        }
        if let Some(recommendations) = request.lifestyle_recommendations {
            update.insert("lifestyleRecommendations".to_string(), json!(recommendations));
        }
        update.insert("updatedAt".to_string(), json!(now));

        let completed = matches!(request.status, Some(ConsultationStatus::Completed));

        self.store
            .update_one(
                "consultations",
                json!({ "id": consultation_id }),
                json!({ "$set": Value::Object(update) }),
            )
            .await
            .map_err(|e| ConsultationError::Database(e.to_string()))?;

        if completed {
            self.store
                .update_one(
                    "doctors",
                    json!({ "id": consultation.doctor_id }),
                    json!({ "$inc": { "totalConsultations": 1 } }),
                )
                .await
                .map_err(|e| ConsultationError::Database(e.to_string()))?;
        }

        self.get_consultation(consultation_id).await
    }

    pub async fn add_prescription(
        &self,
        consultation_id: Uuid,
        request: PrescriptionRequest,
    ) -> Result<Consultation, ConsultationError> {
        let _ = self.get_consultation(consultation_id).await?;

        let mut update = Map::new();
        if let Some(prescriptions) = request.prescriptions {
            update.insert("prescriptions".to_string(), json!(prescriptions));
        }
        if let Some(diagnosis) = request.diagnosis {
            update.insert("diagnosis".to_string(), json!(diagnosis));
        }
        if let Some(treatment) = request.treatment {
            update.insert("treatment".to_string(), json!(treatment));
        }
        if let Some(advice) = request.dietary_advice {
            update.insert("dietaryAdvice".to_string(), json!(advice));
        }
        if let Some(recommendations) = request.lifestyle_recommendations {
            update.insert("lifestyleRecommendations".to_string(), json!(recommendations));
        }
        update.insert("updatedAt".to_string(), json!(Utc::now()));

        self.store
            .update_one(
                "consultations",
                json!({ "id": consultation_id }),
                json!({ "$set": Value::Object(update) }),
            )
            .await
            .map_err(|e| ConsultationError::Database(e.to_string()))?;

        self.get_consultation(consultation_id).await
    }

    pub async fn add_assessment(
        &self,
        consultation_id: Uuid,
        request: AssessmentRequest,
    ) -> Result<Consultation, ConsultationError> {
        let _ = self.get_consultation(consultation_id).await?;

        let mut update = Map::new();
        if let Some(prakriti) = request.prakriti {
            update.insert("prakriti".to_string(), json!(prakriti));
        }
        if let Some(vikriti) = request.vikriti {
            update.insert("vikriti".to_string(), json!(vikriti));
        }
        if let Some(pulse) = request.pulse {
            if pulse.len() > 200 {
                return Err(ConsultationError::ValidationError(
                    "Pulse description cannot exceed 200 characters".to_string(),
                ));
            }
            update.insert("pulse".to_string(), json!(pulse));
        }
        if let Some(tongue) = request.tongue {
            if tongue.len() > 200 {
                return Err(ConsultationError::ValidationError(
                    "Tongue examination cannot exceed 200 characters".to_string(),
                ));
            }
            update.insert("tongue".to_string(), json!(tongue));
        }
        update.insert("updatedAt".to_string(), json!(Utc::now()));

        self.store
            .update_one(
                "consultations",
                json!({ "id": consultation_id }),
                json!({ "$set": Value::Object(update) }),
            )
            .await
            .map_err(|e| ConsultationError::Database(e.to_string()))?;

        self.get_consultation(consultation_id).await
    }

    pub async fn stats_summary(
        &self,
        query: ConsultationStatsQuery,
    ) -> Result<Value, ConsultationError> {
        let mut match_filter = Map::new();
        if let Some(doctor_id) = query.doctor_id {
            match_filter.insert("doctorId".to_string(), json!(doctor_id));
        }
        if query.start_date.is_some() || query.end_date.is_some() {
            let mut range = Map::new();
            if let Some(start) = query.start_date {
                range.insert("$gte".to_string(), json!(start));
            }
            if let Some(end) = query.end_date {
                range.insert("$lte".to_string(), json!(end));
            }
            match_filter.insert("consultationDate".to_string(), Value::Object(range));
        }

        let pipeline = json!([
            { "$match": Value::Object(match_filter) },
            { "$group": {
                "_id": null,
                "totalConsultations": { "$sum": 1 },
                "completedConsultations": {
                    "$sum": { "$cond": [{ "$eq": ["$status", "completed"] }, 1, 0] }
                },
                "scheduledConsultations": {
                    "$sum": { "$cond": [{ "$eq": ["$status", "scheduled"] }, 1, 0] }
                },
                "cancelledConsultations": {
                    "$sum": { "$cond": [{ "$eq": ["$status", "cancelled"] }, 1, 0] }
                },
                "totalRevenue": { "$sum": "$consultationFee" },
                "averageConsultationFee": { "$avg": "$consultationFee" },
                "averageRating": { "$avg": "$doctorRating" }
            }}
        ]);

        let results = self
            .store
            .aggregate("consultations", pipeline)
            .await
            .map_err(|e| ConsultationError::Database(e.to_string()))?;

        let mut summary = results.into_iter().next().unwrap_or_else(|| {
            json!({
                "totalConsultations": 0,
                "completedConsultations": 0,
                "scheduledConsultations": 0,
                "cancelledConsultations": 0,
                "totalRevenue": 0,
                "averageConsultationFee": 0,
                "averageRating": 0
            })
        });
        if let Some(map) = summary.as_object_mut() {
            map.remove("_id");
        }

        Ok(summary)
    }

    fn validate_create(&self, request: &CreateConsultationRequest) -> Result<(), ConsultationError> {
        if request.patient_name.trim().is_empty() {
            return Err(ConsultationError::ValidationError(
                "Patient name is required".to_string(),
            ));
        }
        if !is_valid_email(request.patient_email.trim()) {
            return Err(ConsultationError::ValidationError(
                "Please provide a valid patient email".to_string(),
            ));
        }
        if !is_valid_phone(request.patient_phone.trim()) {
            return Err(ConsultationError::ValidationError(
                "Please provide a valid patient phone number".to_string(),
            ));
        }
        if let Some(age) = request.patient_age {
            if !(0..=120).contains(&age) {
                return Err(ConsultationError::ValidationError(
                    "Age must be between 0 and 120".to_string(),
                ));
            }
        }
        if request.chief_complaint.trim().is_empty() {
            return Err(ConsultationError::ValidationError(
                "Chief complaint is required".to_string(),
            ));
        }
        if request.chief_complaint.len() > 1000 {
            return Err(ConsultationError::ValidationError(
                "Chief complaint cannot exceed 1000 characters".to_string(),
            ));
        }

        Ok(())
    }
}
