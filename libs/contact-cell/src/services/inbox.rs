use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::DocumentStore;
use shared_utils::validation::{is_valid_email, is_valid_phone};

use crate::models::{
    Contact, ContactError, ContactListQuery, ContactStatsQuery, ContactStatus, InternalNote,
    Priority, ResolveRequest, RespondRequest, SubmitContactRequest, UpdateContactStatusRequest,
};

/// Request metadata captured alongside a submission.
#[derive(Debug, Default, Clone)]
pub struct SubmissionContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub referrer_page: Option<String>,
}

pub struct InboxService {
    store: DocumentStore,
}

impl InboxService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: DocumentStore::new(config),
        }
    }

    pub async fn submit(
        &self,
        request: SubmitContactRequest,
        context: SubmissionContext,
    ) -> Result<Contact, ContactError> {
        let name = request.name.as_deref().map(str::trim).unwrap_or_default();
        let email = request.email.as_deref().map(str::trim).unwrap_or_default();
        let phone = request.phone.as_deref().map(str::trim).unwrap_or_default();
        let message = request.message.as_deref().map(str::trim).unwrap_or_default();

        if name.is_empty() || email.is_empty() || phone.is_empty() || message.is_empty() {
            return Err(ContactError::ValidationError(
                "Please provide all required fields: name, email, phone, and message".to_string(),
            ));
        }
        if name.len() > 100 {
            return Err(ContactError::ValidationError(
                "Name cannot exceed 100 characters".to_string(),
            ));
        }
        if !is_valid_email(email) {
            return Err(ContactError::ValidationError(
                "Please provide a valid email".to_string(),
            ));
        }
        if !is_valid_phone(phone) {
            return Err(ContactError::ValidationError(
                "Please provide a valid phone number".to_string(),
            ));
        }
        if message.len() > 2000 {
            return Err(ContactError::ValidationError(
                "Message cannot exceed 2000 characters".to_string(),
            ));
        }

        let inquiry_type = request.inquiry_type.unwrap_or_default();
        let priority = Priority::for_inquiry(inquiry_type);
        let now = Utc::now();

        let contact = Contact {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_lowercase(),
            phone: phone.to_string(),
            subject: request.subject.map(|s| s.trim().to_string()),
            message: message.to_string(),
            inquiry_type,
            priority,
            status: ContactStatus::New,
            assigned_to: None,
            assigned_at: None,
            response: None,
            follow_up_required: false,
            follow_up_date: None,
            user_agent: context.user_agent,
            ip_address: context.ip_address,
            referrer_page: context.referrer_page,
            internal_notes: Vec::new(),
            resolution_summary: None,
            resolved_at: None,
            resolution_time: None,
            satisfaction_rating: None,
            source: "website".to_string(),
            is_spam: false,
            created_at: now,
            updated_at: now,
        };

        let document =
            serde_json::to_value(&contact).map_err(|e| ContactError::Database(e.to_string()))?;
        self.store
            .insert_one("contacts", document)
            .await
            .map_err(|e| ContactError::Database(e.to_string()))?;

        info!("Contact inquiry {} submitted ({:?})", contact.id, contact.priority);
        Ok(contact)
    }

    pub async fn get_contact(&self, contact_id: Uuid) -> Result<Contact, ContactError> {
        let document = self
            .store
            .find_one("contacts", json!({ "id": contact_id }))
            .await
            .map_err(|e| ContactError::Database(e.to_string()))?
            .ok_or(ContactError::NotFound)?;

        serde_json::from_value(document).map_err(|e| ContactError::Database(e.to_string()))
    }

    pub async fn list_contacts(
        &self,
        query: ContactListQuery,
        limit: i64,
        skip: i64,
    ) -> Result<(Vec<Contact>, i64), ContactError> {
        debug!("Listing contact inquiries");

        let mut filter = Map::new();
        if let Some(status) = query.status {
            filter.insert("status".to_string(), json!(status));
        }
        if let Some(priority) = query.priority {
            filter.insert("priority".to_string(), json!(priority));
        }
        if let Some(inquiry_type) = query.inquiry_type {
            filter.insert("inquiryType".to_string(), json!(inquiry_type));
        }
        if let Some(assigned_to) = query.assigned_to {
            filter.insert("assignedTo".to_string(), json!(assigned_to));
        }
        if let Some(search) = query.search {
            filter.insert(
                "$or".to_string(),
                json!([
                    { "name": { "$regex": search, "$options": "i" } },
                    { "email": { "$regex": search, "$options": "i" } },
                    { "subject": { "$regex": search, "$options": "i" } },
                    { "message": { "$regex": search, "$options": "i" } }
                ]),
            );
        }

        let filter = Value::Object(filter);
        let documents = self
            .store
            .find(
                "contacts",
                filter.clone(),
                Some(json!({ "createdAt": -1, "priority": -1 })),
                Some(limit),
                Some(skip),
            )
            .await
            .map_err(|e| ContactError::Database(e.to_string()))?;

        let total = self
            .store
            .count("contacts", filter)
            .await
            .map_err(|e| ContactError::Database(e.to_string()))?;

        Ok((parse_contacts(documents)?, total))
    }

    /// Open inquiries, most urgent first, capped at 50.
    pub async fn pending_inquiries(&self) -> Result<Vec<Contact>, ContactError> {
        let documents = self
            .store
            .find(
                "contacts",
                json!({ "status": { "$in": ["new", "assigned", "in-progress"] } }),
                Some(json!({ "priority": -1, "createdAt": 1 })),
                Some(50),
                None,
            )
            .await
            .map_err(|e| ContactError::Database(e.to_string()))?;

        parse_contacts(documents)
    }

    pub async fn update_status(
        &self,
        contact_id: Uuid,
        request: UpdateContactStatusRequest,
    ) -> Result<Contact, ContactError> {
        let contact = self.get_contact(contact_id).await?;

        let now = Utc::now();
        let mut update = Map::new();

        if let Some(status) = &request.status {
            let status: ContactStatus = serde_json::from_value(json!(status))
                .map_err(|_| ContactError::InvalidStatus)?;
            update.insert("status".to_string(), json!(status));

            if status == ContactStatus::Resolved && contact.resolved_at.is_none() {
                update.insert("resolvedAt".to_string(), json!(now));
                let hours = (now - contact.created_at).num_seconds() as f64 / 3600.0;
                update.insert("resolutionTime".to_string(), json!(hours));
            }
        }
        if let Some(assigned_to) = &request.assigned_to {
            update.insert("assignedTo".to_string(), json!(assigned_to));
            if contact.assigned_at.is_none() {
                update.insert("assignedAt".to_string(), json!(now));
            }
        }
        update.insert("updatedAt".to_string(), json!(now));

        let mut update_doc = Map::new();
        update_doc.insert("$set".to_string(), Value::Object(update));

        if let Some(notes) = &request.notes {
            let note = InternalNote {
                note: notes.clone(),
                added_by: "system".to_string(),
                added_at: now,
            };
            update_doc.insert("$push".to_string(), json!({ "internalNotes": note }));
        }

        self.store
            .update_one(
                "contacts",
                json!({ "id": contact_id }),
                Value::Object(update_doc),
            )
            .await
            .map_err(|e| ContactError::Database(e.to_string()))?;

        self.get_contact(contact_id).await
    }

    /// Record a support response; a fresh inquiry moves to in-progress.
    pub async fn respond(
        &self,
        contact_id: Uuid,
        request: RespondRequest,
    ) -> Result<Contact, ContactError> {
        let message = request
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                ContactError::ValidationError("Response message is required".to_string())
            })?;

        let contact = self.get_contact(contact_id).await?;

        let now = Utc::now();
        let responded_by = request
            .responded_by
            .unwrap_or_else(|| "Support Team".to_string());

        let mut update = Map::new();
        update.insert(
            "response".to_string(),
            json!({
                "message": message,
                "respondedBy": responded_by,
                "respondedAt": now
            }),
        );
        if matches!(contact.status, ContactStatus::New | ContactStatus::Assigned) {
            update.insert("status".to_string(), json!(ContactStatus::InProgress));
        }
        update.insert("updatedAt".to_string(), json!(now));

        self.store
            .update_one(
                "contacts",
                json!({ "id": contact_id }),
                json!({ "$set": Value::Object(update) }),
            )
            .await
            .map_err(|e| ContactError::Database(e.to_string()))?;

        self.get_contact(contact_id).await
    }

    pub async fn resolve(
        &self,
        contact_id: Uuid,
        request: ResolveRequest,
    ) -> Result<Contact, ContactError> {
        let summary = request
            .resolution_summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ContactError::ValidationError("Resolution summary is required".to_string())
            })?;

        let contact = self.get_contact(contact_id).await?;

        let now = Utc::now();
        let hours = (now - contact.created_at).num_seconds() as f64 / 3600.0;

        self.store
            .update_one(
                "contacts",
                json!({ "id": contact_id }),
                json!({ "$set": {
                    "status": ContactStatus::Resolved,
                    "resolutionSummary": summary,
                    "resolvedAt": now,
                    "resolutionTime": hours,
                    "updatedAt": now
                }}),
            )
            .await
            .map_err(|e| ContactError::Database(e.to_string()))?;

        self.get_contact(contact_id).await
    }

    pub async fn stats_summary(&self, query: ContactStatsQuery) -> Result<Value, ContactError> {
        let mut match_filter = Map::new();
        if query.start_date.is_some() || query.end_date.is_some() {
            let mut range = Map::new();
            if let Some(start) = query.start_date {
                range.insert("$gte".to_string(), json!(start));
            }
            if let Some(end) = query.end_date {
                range.insert("$lte".to_string(), json!(end));
            }
            match_filter.insert("createdAt".to_string(), Value::Object(range));
        }

        let pipeline = json!([
            { "$match": Value::Object(match_filter.clone()) },
            { "$group": {
                "_id": null,
                "totalInquiries": { "$sum": 1 },
                "newInquiries": {
                    "$sum": { "$cond": [{ "$eq": ["$status", "new"] }, 1, 0] }
                },
                "inProgressInquiries": {
                    "$sum": { "$cond": [{ "$eq": ["$status", "in-progress"] }, 1, 0] }
                },
                "resolvedInquiries": {
                    "$sum": { "$cond": [{ "$eq": ["$status", "resolved"] }, 1, 0] }
                },
                "highPriorityInquiries": {
                    "$sum": { "$cond": [{ "$eq": ["$priority", "high"] }, 1, 0] }
                },
                "averageResolutionTime": { "$avg": "$resolutionTime" },
                "inquiryTypes": { "$addToSet": "$inquiryType" }
            }}
        ]);

        let results = self
            .store
            .aggregate("contacts", pipeline)
            .await
            .map_err(|e| ContactError::Database(e.to_string()))?;

        let mut summary = results.into_iter().next().unwrap_or_else(|| {
            json!({
                "totalInquiries": 0,
                "newInquiries": 0,
                "inProgressInquiries": 0,
                "resolvedInquiries": 0,
                "highPriorityInquiries": 0,
                "averageResolutionTime": 0,
                "inquiryTypes": []
            })
        });

        let mut pending_filter = match_filter;
        pending_filter.insert(
            "status".to_string(),
            json!({ "$in": ["new", "assigned", "in-progress"] }),
        );
        let pending = self
            .store
            .count("contacts", Value::Object(pending_filter))
            .await
            .map_err(|e| ContactError::Database(e.to_string()))?;

        if let Some(map) = summary.as_object_mut() {
            map.remove("_id");
            map.insert("pendingInquiries".to_string(), json!(pending));

            let total = map["totalInquiries"].as_f64().unwrap_or(0.0);
            let resolved = map["resolvedInquiries"].as_f64().unwrap_or(0.0);
            let rate = if total > 0.0 {
                format!("{:.2}", resolved / total * 100.0)
            } else {
                "0".to_string()
            };
            map.insert("resolutionRate".to_string(), json!(rate));
        }

        Ok(summary)
    }
}

fn parse_contacts(documents: Vec<Value>) -> Result<Vec<Contact>, ContactError> {
    documents
        .into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(|e| ContactError::Database(e.to_string())))
        .collect()
}
