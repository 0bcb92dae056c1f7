use chrono::{NaiveTime, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::services::directory::DirectoryService;
use shared_config::AppConfig;
use shared_database::DocumentStore;
use shared_utils::validation::{is_valid_email, is_valid_phone};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, BookingParty,
    CancelRequest, ConfirmationStatus, ConsultationMode, DoctorAppointmentsQuery,
    PatientAppointmentsQuery, PaymentStatus, RescheduleRequest, UpdateStatusRequest,
};

const MEETING_BASE_URL: &str = "https://meet.amrutam.com";

pub struct BookingService {
    store: DocumentStore,
    directory: DirectoryService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: DocumentStore::new(config),
            directory: DirectoryService::new(config),
        }
    }

    /// Book an appointment slot. The availability check is a
    /// query-then-insert: two concurrent bookings for the same slot can both
    /// pass the check. That matches the documented booking contract.
    pub async fn create_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment with doctor {} on {} {}",
            request.doctor_id, request.appointment_date, request.appointment_time
        );

        self.validate_booking(&request)?;

        let doctor = self
            .directory
            .get_doctor(request.doctor_id)
            .await
            .map_err(|_| AppointmentError::DoctorNotAvailable)?;

        if !doctor.is_active || !doctor.is_verified {
            return Err(AppointmentError::DoctorNotAvailable);
        }

        let taken = self
            .store
            .find_one(
                "appointments",
                json!({
                    "doctorId": request.doctor_id,
                    "appointmentDate": request.appointment_date,
                    "appointmentTime": request.appointment_time.clone(),
                    "status": { "$in": ["scheduled", "confirmed"] }
                }),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if taken.is_some() {
            warn!(
                "Slot already booked for doctor {} at {} {}",
                request.doctor_id, request.appointment_date, request.appointment_time
            );
            return Err(AppointmentError::SlotTaken);
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut appointment = Appointment {
            id,
            doctor_id: request.doctor_id,
            patient_name: request.patient_name.trim().to_string(),
            patient_email: request.patient_email.trim().to_lowercase(),
            patient_phone: request.patient_phone.trim().to_string(),
            patient_age: request.patient_age,
            appointment_date: request.appointment_date,
            appointment_time: request.appointment_time,
            duration: request.duration.unwrap_or(30),
            appointment_type: request.appointment_type.unwrap_or_default(),
            consultation_mode: request.consultation_mode,
            reason_for_visit: request.reason_for_visit.trim().to_string(),
            symptoms: request.symptoms.unwrap_or_default(),
            urgency_level: request.urgency_level.unwrap_or_default(),
            status: AppointmentStatus::Scheduled,
            confirmation_status: ConfirmationStatus::Pending,
            booked_at: now,
            booked_by: BookingParty::Patient,
            consultation_fee: doctor.consultation_fee,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            transaction_id: None,
            original_appointment_date: None,
            rescheduled_by: None,
            rescheduling_reason: None,
            rescheduling_count: 0,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            meeting_link: None,
            meeting_id: None,
            special_instructions: request.special_instructions,
            doctor_notes: None,
            patient_feedback: None,
            created_at: now,
            updated_at: now,
        };

        if matches!(
            appointment.consultation_mode,
            ConsultationMode::Video | ConsultationMode::Audio
        ) {
            let meeting_id = format!("amrutam-{}", &id.simple().to_string()[..8]);
            appointment.meeting_link = Some(format!("{}/{}", MEETING_BASE_URL, meeting_id));
            appointment.meeting_id = Some(meeting_id);
        }

        let document = serde_json::to_value(&appointment)
            .map_err(|e| AppointmentError::Database(e.to_string()))?;
        self.store
            .insert_one("appointments", document)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        info!("Appointment {} scheduled with doctor {}", appointment.id, doctor.id);
        Ok(appointment)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let document = self
            .store
            .find_one("appointments", json!({ "id": appointment_id }))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?
            .ok_or(AppointmentError::NotFound)?;

        serde_json::from_value(document).map_err(|e| AppointmentError::Database(e.to_string()))
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        query: DoctorAppointmentsQuery,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<Appointment>, i64), AppointmentError> {
        debug!("Listing appointments for doctor {}", doctor_id);

        let mut filter = Map::new();
        filter.insert("doctorId".to_string(), json!(doctor_id));

        if let Some(status) = query.status {
            filter.insert("status".to_string(), json!(status));
        }
        if let Some(date) = query.date {
            filter.insert("appointmentDate".to_string(), json!(date));
        }
        if query.upcoming.unwrap_or(false) {
            filter.insert(
                "appointmentDate".to_string(),
                json!({ "$gte": Utc::now().date_naive() }),
            );
            filter.insert(
                "status".to_string(),
                json!({ "$in": ["scheduled", "confirmed"] }),
            );
        }

        let filter = Value::Object(filter);
        let documents = self
            .store
            .find(
                "appointments",
                filter.clone(),
                Some(json!({ "appointmentDate": 1, "appointmentTime": 1 })),
                Some(limit),
                Some(skip),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let total = self
            .store
            .count("appointments", filter)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok((parse_appointments(documents)?, total))
    }

    pub async fn list_for_patient(
        &self,
        email: &str,
        query: PatientAppointmentsQuery,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<Appointment>, i64), AppointmentError> {
        let mut filter = Map::new();
        filter.insert("patientEmail".to_string(), json!(email.to_lowercase()));
        if let Some(status) = query.status {
            filter.insert("status".to_string(), json!(status));
        }

        let filter = Value::Object(filter);
        let documents = self
            .store
            .find(
                "appointments",
                filter.clone(),
                Some(json!({ "appointmentDate": -1 })),
                Some(limit),
                Some(skip),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let total = self
            .store
            .count("appointments", filter)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok((parse_appointments(documents)?, total))
    }

    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        request: UpdateStatusRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.get_appointment(appointment_id).await?;

        let status: AppointmentStatus = serde_json::from_value(json!(request.status))
            .map_err(|_| AppointmentError::InvalidStatus)?;

        let now = Utc::now();
        let mut update = Map::new();
        update.insert("status".to_string(), json!(status));
        update.insert("updatedAt".to_string(), json!(now));
        if let Some(notes) = &request.notes {
            update.insert("doctorNotes".to_string(), json!(notes));
            appointment.doctor_notes = Some(notes.clone());
        }
        if status == AppointmentStatus::Cancelled && appointment.cancelled_at.is_none() {
            update.insert("cancelledAt".to_string(), json!(now));
            appointment.cancelled_at = Some(now);
        }

        self.store
            .update_one(
                "appointments",
                json!({ "id": appointment_id }),
                json!({ "$set": Value::Object(update) }),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        appointment.status = status;
        appointment.updated_at = now;
        Ok(appointment)
    }

    pub async fn reschedule(
        &self,
        appointment_id: Uuid,
        request: RescheduleRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.get_appointment(appointment_id).await?;

        if NaiveTime::parse_from_str(&request.new_time, "%H:%M").is_err() {
            return Err(AppointmentError::ValidationError(
                "Appointment time must be in HH:MM format".to_string(),
            ));
        }

        if !appointment.can_be_rescheduled(Utc::now()) {
            return Err(AppointmentError::CannotReschedule);
        }

        let conflict = self
            .store
            .find_one(
                "appointments",
                json!({
                    "doctorId": appointment.doctor_id,
                    "appointmentDate": request.new_date,
                    "appointmentTime": request.new_time.clone(),
                    "status": { "$in": ["scheduled", "confirmed"] },
                    "id": { "$ne": appointment_id }
                }),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if conflict.is_some() {
            return Err(AppointmentError::NewSlotTaken);
        }

        let original_date = appointment
            .original_appointment_date
            .unwrap_or(appointment.appointment_date);
        let rescheduled_by = request.rescheduled_by.unwrap_or(BookingParty::Patient);
        let now = Utc::now();

        let update = json!({ "$set": {
            "appointmentDate": request.new_date,
            "appointmentTime": request.new_time.clone(),
            "status": AppointmentStatus::Rescheduled,
            "originalAppointmentDate": original_date,
            "reschedulingReason": request.reason.clone(),
            "rescheduledBy": rescheduled_by,
            "reschedulingCount": appointment.rescheduling_count + 1,
            "updatedAt": now
        }});

        self.store
            .update_one("appointments", json!({ "id": appointment_id }), update)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        appointment.original_appointment_date = Some(original_date);
        appointment.appointment_date = request.new_date;
        appointment.appointment_time = request.new_time;
        appointment.status = AppointmentStatus::Rescheduled;
        appointment.rescheduling_reason = request.reason;
        appointment.rescheduled_by = Some(rescheduled_by);
        appointment.rescheduling_count += 1;
        appointment.updated_at = now;

        info!(
            "Appointment {} rescheduled to {} {} (count {})",
            appointment.id,
            appointment.appointment_date,
            appointment.appointment_time,
            appointment.rescheduling_count
        );
        Ok(appointment)
    }

    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        request: CancelRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.get_appointment(appointment_id).await?;

        if !appointment.can_be_cancelled(Utc::now()) {
            return Err(AppointmentError::CannotCancel);
        }

        let cancelled_by = request.cancelled_by.unwrap_or(BookingParty::Patient);
        let now = Utc::now();

        let update = json!({ "$set": {
            "status": AppointmentStatus::Cancelled,
            "cancellationReason": request.reason.clone(),
            "cancelledBy": cancelled_by,
            "cancelledAt": now,
            "updatedAt": now
        }});

        self.store
            .update_one("appointments", json!({ "id": appointment_id }), update)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        appointment.status = AppointmentStatus::Cancelled;
        appointment.cancellation_reason = request.reason;
        appointment.cancelled_by = Some(cancelled_by);
        appointment.cancelled_at = Some(now);
        appointment.updated_at = now;

        info!("Appointment {} cancelled", appointment.id);
        Ok(appointment)
    }

    fn validate_booking(&self, request: &BookAppointmentRequest) -> Result<(), AppointmentError> {
        if request.patient_name.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "Patient name is required".to_string(),
            ));
        }
        if !is_valid_email(request.patient_email.trim()) {
            return Err(AppointmentError::ValidationError(
                "Please provide a valid patient email".to_string(),
            ));
        }
        if !is_valid_phone(request.patient_phone.trim()) {
            return Err(AppointmentError::ValidationError(
                "Please provide a valid patient phone number".to_string(),
            ));
        }
        if let Some(age) = request.patient_age {
            if !(0..=120).contains(&age) {
                return Err(AppointmentError::ValidationError(
                    "Age must be between 0 and 120".to_string(),
                ));
            }
        }
        if NaiveTime::parse_from_str(&request.appointment_time, "%H:%M").is_err() {
            return Err(AppointmentError::ValidationError(
                "Appointment time must be in HH:MM format".to_string(),
            ));
        }
        if let Some(duration) = request.duration {
            if !(15..=120).contains(&duration) {
                return Err(AppointmentError::ValidationError(
                    "Duration must be between 15 and 120 minutes".to_string(),
                ));
            }
        }
        if request.reason_for_visit.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "Reason for visit is required".to_string(),
            ));
        }
        if request.reason_for_visit.len() > 500 {
            return Err(AppointmentError::ValidationError(
                "Reason cannot exceed 500 characters".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_appointments(documents: Vec<Value>) -> Result<Vec<Appointment>, AppointmentError> {
    documents
        .into_iter()
        .map(|doc| {
            serde_json::from_value(doc).map_err(|e| AppointmentError::Database(e.to_string()))
        })
        .collect()
}
