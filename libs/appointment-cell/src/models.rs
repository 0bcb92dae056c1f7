use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::error::AppError;

pub const MAX_RESCHEDULES: i32 = 2;
pub const MIN_CANCEL_NOTICE_HOURS: i64 = 2;
pub const MIN_RESCHEDULE_NOTICE_HOURS: i64 = 4;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in-progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no-show"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentType {
    Consultation,
    FollowUp,
    Emergency,
    RoutineCheckup,
}

impl Default for AppointmentType {
    fn default() -> Self {
        AppointmentType::Consultation
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ConsultationMode {
    Video,
    Audio,
    Chat,
    InPerson,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Emergency,
}

impl Default for UrgencyLevel {
    fn default() -> Self {
        UrgencyLevel::Medium
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmationStatus {
    Pending,
    ConfirmedByDoctor,
    ConfirmedByPatient,
    AutoConfirmed,
}

impl Default for ConfirmationStatus {
    fn default() -> Self {
        ConfirmationStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
    Waived,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingParty {
    Patient,
    Doctor,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientFeedback {
    pub rating: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_age: Option<i32>,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub duration: i32,
    pub appointment_type: AppointmentType,
    pub consultation_mode: ConsultationMode,
    pub reason_for_visit: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub urgency_level: UrgencyLevel,
    pub status: AppointmentStatus,
    pub confirmation_status: ConfirmationStatus,
    pub booked_at: DateTime<Utc>,
    pub booked_by: BookingParty,
    pub consultation_fee: f64,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_appointment_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescheduled_by: Option<BookingParty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescheduling_reason: Option<String>,
    #[serde(default)]
    pub rescheduling_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<BookingParty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_feedback: Option<PatientFeedback>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Combined start instant from the stored date and "HH:MM" time.
    pub fn appointment_date_time(&self) -> Option<DateTime<Utc>> {
        let time = NaiveTime::parse_from_str(&self.appointment_time, "%H:%M").ok()?;
        Some(self.appointment_date.and_time(time).and_utc())
    }

    pub fn appointment_end_time(&self) -> Option<DateTime<Utc>> {
        self.appointment_date_time()
            .map(|start| start + Duration::minutes(self.duration as i64))
    }

    /// Cancellable while still scheduled/confirmed and more than two hours out.
    pub fn can_be_cancelled(&self, now: DateTime<Utc>) -> bool {
        let Some(start) = self.appointment_date_time() else {
            return false;
        };

        matches!(
            self.status,
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
        ) && start - now > Duration::hours(MIN_CANCEL_NOTICE_HOURS)
    }

    /// Reschedulable with more than four hours notice and under the
    /// reschedule cap.
    pub fn can_be_rescheduled(&self, now: DateTime<Utc>) -> bool {
        let Some(start) = self.appointment_date_time() else {
            return false;
        };

        matches!(
            self.status,
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
        ) && start - now > Duration::hours(MIN_RESCHEDULE_NOTICE_HOURS)
            && self.rescheduling_count < MAX_RESCHEDULES
    }

    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "appointmentDate": self.appointment_date,
            "appointmentTime": self.appointment_time,
            "duration": self.duration,
            "consultationMode": self.consultation_mode,
            "status": self.status,
            "consultationFee": self.consultation_fee,
            "paymentStatus": self.payment_status,
            "meetingLink": self.meeting_link,
        })
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub patient_age: Option<i32>,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub duration: Option<i32>,
    pub appointment_type: Option<AppointmentType>,
    pub consultation_mode: ConsultationMode,
    pub reason_for_visit: String,
    pub symptoms: Option<Vec<String>>,
    pub urgency_level: Option<UrgencyLevel>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub new_date: NaiveDate,
    pub new_time: String,
    pub reason: Option<String>,
    pub rescheduled_by: Option<BookingParty>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub reason: Option<String>,
    pub cancelled_by: Option<BookingParty>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorAppointmentsQuery {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub upcoming: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientAppointmentsQuery {
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlot {
    pub start_time: String,
    pub end_time: String,
    pub available: bool,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(thiserror::Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found or not available")]
    DoctorNotAvailable,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("This time slot is already booked")]
    SlotTaken,

    #[error("The new time slot is already booked")]
    NewSlotTaken,

    #[error("Appointment cannot be cancelled (too close to appointment time)")]
    CannotCancel,

    #[error("Appointment cannot be rescheduled (too close to appointment time or maximum reschedules reached)")]
    CannotReschedule,

    #[error("Invalid status")]
    InvalidStatus,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::DoctorNotFound => AppError::NotFound(err.to_string()),
            AppointmentError::DoctorNotAvailable
            | AppointmentError::SlotTaken
            | AppointmentError::NewSlotTaken
            | AppointmentError::CannotCancel
            | AppointmentError::CannotReschedule
            | AppointmentError::InvalidStatus => AppError::BadRequest(err.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_appointment() -> Appointment {
        let now = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
        Appointment {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            patient_name: "Ravi Kumar".to_string(),
            patient_email: "ravi@example.com".to_string(),
            patient_phone: "9812345678".to_string(),
            patient_age: Some(34),
            appointment_date: NaiveDate::from_ymd_opt(2030, 6, 10).unwrap(),
            appointment_time: "09:00".to_string(),
            duration: 30,
            appointment_type: AppointmentType::Consultation,
            consultation_mode: ConsultationMode::Video,
            reason_for_visit: "Persistent acidity".to_string(),
            symptoms: vec![],
            urgency_level: UrgencyLevel::Medium,
            status: AppointmentStatus::Scheduled,
            confirmation_status: ConfirmationStatus::Pending,
            booked_at: now,
            booked_by: BookingParty::Patient,
            consultation_fee: 500.0,
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
            special_instructions: None,
            doctor_notes: None,
            patient_feedback: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn end_time_adds_duration() {
        let appointment = base_appointment();
        let start = appointment.appointment_date_time().unwrap();
        let end = appointment.appointment_end_time().unwrap();
        assert_eq!(end - start, Duration::minutes(30));
    }

    #[test]
    fn cancellation_needs_two_hours_notice() {
        let appointment = base_appointment();
        let start = appointment.appointment_date_time().unwrap();

        assert!(appointment.can_be_cancelled(start - Duration::hours(3)));
        assert!(!appointment.can_be_cancelled(start - Duration::minutes(90)));
    }

    #[test]
    fn completed_appointments_cannot_be_cancelled() {
        let mut appointment = base_appointment();
        appointment.status = AppointmentStatus::Completed;
        let start = appointment.appointment_date_time().unwrap();

        assert!(!appointment.can_be_cancelled(start - Duration::days(2)));
    }

    #[test]
    fn reschedule_needs_four_hours_and_under_cap() {
        let mut appointment = base_appointment();
        let start = appointment.appointment_date_time().unwrap();

        assert!(appointment.can_be_rescheduled(start - Duration::hours(5)));
        assert!(!appointment.can_be_rescheduled(start - Duration::hours(3)));

        appointment.rescheduling_count = MAX_RESCHEDULES;
        assert!(!appointment.can_be_rescheduled(start - Duration::days(7)));
    }

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(AppointmentStatus::InProgress).unwrap(),
            serde_json::json!("in-progress")
        );
        assert_eq!(
            serde_json::to_value(AppointmentStatus::NoShow).unwrap(),
            serde_json::json!("no-show")
        );
        assert_eq!(
            serde_json::to_value(ConsultationMode::InPerson).unwrap(),
            serde_json::json!("in-person")
        );
    }

    #[test]
    fn invalid_time_string_disables_derived_fields() {
        let mut appointment = base_appointment();
        appointment.appointment_time = "morning".to_string();

        assert!(appointment.appointment_date_time().is_none());
        assert!(!appointment.can_be_cancelled(Utc::now()));
    }
}
