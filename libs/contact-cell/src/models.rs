use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

// ==============================================================================
// CORE CONTACT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum InquiryType {
    General,
    TechnicalSupport,
    DoctorRegistration,
    PatientInquiry,
    Billing,
    Partnership,
    Complaint,
    Feedback,
    Other,
}

impl Default for InquiryType {
    fn default() -> Self {
        InquiryType::General
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Support SLA window in hours for this priority.
    pub fn sla_hours(&self) -> i64 {
        match self {
            Priority::Urgent => 2,
            Priority::High => 8,
            Priority::Medium => 24,
            Priority::Low => 72,
        }
    }

    /// Triage rule applied when an inquiry is submitted.
    pub fn for_inquiry(inquiry_type: InquiryType) -> Self {
        match inquiry_type {
            InquiryType::TechnicalSupport | InquiryType::Complaint | InquiryType::Billing => {
                Priority::High
            }
            InquiryType::Feedback => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ContactStatus {
    New,
    Assigned,
    InProgress,
    Resolved,
    Closed,
    Escalated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub message: String,
    pub responded_by: String,
    pub responded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalNote {
    pub note: String,
    pub added_by: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    pub inquiry_type: InquiryType,
    pub priority: Priority,
    pub status: ContactStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ContactResponse>,
    #[serde(default)]
    pub follow_up_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer_page: Option<String>,
    #[serde(default)]
    pub internal_notes: Vec<InternalNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction_rating: Option<i32>,
    pub source: String,
    #[serde(default)]
    pub is_spam: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Hours from submission to first response, rounded to two decimals.
    pub fn response_time(&self) -> Option<f64> {
        self.response.as_ref().map(|response| {
            let hours =
                (response.responded_at - self.created_at).num_seconds() as f64 / 3600.0;
            (hours * 100.0).round() / 100.0
        })
    }

    /// An open inquiry is overdue once it has waited longer than its
    /// priority's SLA window. Resolved and closed inquiries never are.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if matches!(self.status, ContactStatus::Resolved | ContactStatus::Closed) {
            return false;
        }

        let hours_open = (now - self.created_at).num_seconds() as f64 / 3600.0;
        hours_open > self.priority.sla_hours() as f64
    }

    /// Serialized view with the SLA verdict attached and internal fields
    /// stripped, used by the admin listing.
    pub fn listing_view(&self, now: DateTime<Utc>) -> serde_json::Value {
        let mut value = self.detail_view(now);
        if let Some(map) = value.as_object_mut() {
            map.remove("internalNotes");
        }
        value
    }

    pub fn detail_view(&self, now: DateTime<Utc>) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(map) = value.as_object_mut() {
            map.insert("isOverdue".to_string(), serde_json::json!(self.is_overdue(now)));
            map.insert("responseTime".to_string(), serde_json::json!(self.response_time()));
        }
        value
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub inquiry_type: Option<InquiryType>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactStatusRequest {
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub message: Option<String>,
    pub responded_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub resolution_summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactListQuery {
    pub status: Option<ContactStatus>,
    pub priority: Option<Priority>,
    pub inquiry_type: Option<InquiryType>,
    pub assigned_to: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStatsQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ContactError {
    #[error("Contact inquiry not found")]
    NotFound,

    #[error("Invalid status")]
    InvalidStatus,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::NotFound => AppError::NotFound(err.to_string()),
            ContactError::InvalidStatus => AppError::BadRequest(err.to_string()),
            ContactError::ValidationError(msg) => AppError::ValidationError(msg),
            ContactError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_contact(priority: Priority) -> Contact {
        let created = Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0).unwrap();
        Contact {
            id: Uuid::new_v4(),
            name: "Kiran Patel".to_string(),
            email: "kiran@example.com".to_string(),
            phone: "9876501234".to_string(),
            subject: Some("Refund status".to_string()),
            message: "My refund has not arrived".to_string(),
            inquiry_type: InquiryType::Billing,
            priority,
            status: ContactStatus::New,
            assigned_to: None,
            assigned_at: None,
            response: None,
            follow_up_required: false,
            follow_up_date: None,
            user_agent: None,
            ip_address: None,
            referrer_page: None,
            internal_notes: vec![],
            resolution_summary: None,
            resolved_at: None,
            resolution_time: None,
            satisfaction_rating: None,
            source: "website".to_string(),
            is_spam: false,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn sla_windows_by_priority() {
        assert_eq!(Priority::Urgent.sla_hours(), 2);
        assert_eq!(Priority::High.sla_hours(), 8);
        assert_eq!(Priority::Medium.sla_hours(), 24);
        assert_eq!(Priority::Low.sla_hours(), 72);
    }

    #[test]
    fn overdue_flips_after_sla_window() {
        let contact = base_contact(Priority::Urgent);
        let created = contact.created_at;

        assert!(!contact.is_overdue(created + Duration::hours(1)));
        assert!(contact.is_overdue(created + Duration::hours(3)));
    }

    #[test]
    fn resolved_inquiries_are_never_overdue() {
        let mut contact = base_contact(Priority::Urgent);
        contact.status = ContactStatus::Resolved;

        assert!(!contact.is_overdue(contact.created_at + Duration::days(30)));

        contact.status = ContactStatus::Closed;
        assert!(!contact.is_overdue(contact.created_at + Duration::days(30)));
    }

    #[test]
    fn priority_derived_from_inquiry_type() {
        assert_eq!(Priority::for_inquiry(InquiryType::TechnicalSupport), Priority::High);
        assert_eq!(Priority::for_inquiry(InquiryType::Complaint), Priority::High);
        assert_eq!(Priority::for_inquiry(InquiryType::Billing), Priority::High);
        assert_eq!(Priority::for_inquiry(InquiryType::Feedback), Priority::Low);
        assert_eq!(Priority::for_inquiry(InquiryType::General), Priority::Medium);
    }

    #[test]
    fn response_time_rounds_to_two_decimals() {
        let mut contact = base_contact(Priority::Medium);
        contact.response = Some(ContactResponse {
            message: "Looking into it".to_string(),
            responded_by: "Support Team".to_string(),
            responded_at: contact.created_at + Duration::minutes(100),
        });

        assert_eq!(contact.response_time(), Some(1.67));
    }

    #[test]
    fn listing_view_hides_internal_notes() {
        let mut contact = base_contact(Priority::Medium);
        contact.internal_notes.push(InternalNote {
            note: "Possible duplicate of another ticket".to_string(),
            added_by: "system".to_string(),
            added_at: contact.created_at,
        });

        let listing = contact.listing_view(Utc::now());
        assert!(listing.get("internalNotes").is_none());
        assert!(listing.get("isOverdue").is_some());

        let detail = contact.detail_view(Utc::now());
        assert!(detail.get("internalNotes").is_some());
    }
}
