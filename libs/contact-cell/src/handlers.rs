use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::api::{success, success_with_message, PageQuery, Pagination};
use shared_models::error::AppError;

use crate::models::{
    ContactListQuery, ContactStatsQuery, Priority, ResolveRequest, RespondRequest,
    SubmitContactRequest, UpdateContactStatusRequest,
};
use crate::services::inbox::{InboxService, SubmissionContext};

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[axum::debug_handler]
pub async fn submit_contact(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
    Json(request): Json<SubmitContactRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = InboxService::new(&state);

    let context = SubmissionContext {
        user_agent: header_string(&headers, "user-agent"),
        ip_address: header_string(&headers, "x-forwarded-for"),
        referrer_page: header_string(&headers, "referer"),
    };

    let contact = service.submit(request, context).await?;

    let estimated_response_time = if contact.priority == Priority::High {
        "4-8 hours"
    } else {
        "24-48 hours"
    };

    let auto_response = format!(
        "Dear {},\n\n\
         Thank you for contacting Amrutam Doctor Portal. We have received your \
         message and will get back to you within {}.\n\n\
         Your inquiry ID: {}\n\
         Subject: {}\n\n\
         Best regards,\n\
         Amrutam Support Team",
        contact.name,
        estimated_response_time,
        contact.id,
        contact.subject.as_deref().unwrap_or("General Inquiry"),
    );

    Ok((
        StatusCode::CREATED,
        success_with_message(
            "Your message has been sent successfully. We will get back to you soon.",
            json!({
                "inquiryId": contact.id,
                "name": contact.name,
                "email": contact.email,
                "inquiryType": contact.inquiry_type,
                "priority": contact.priority,
                "estimatedResponseTime": estimated_response_time,
                "autoResponse": auto_response
            }),
        ),
    ))
}

#[axum::debug_handler]
pub async fn list_contacts(
    State(state): State<Arc<AppConfig>>,
    Query(page): Query<PageQuery>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = InboxService::new(&state);

    let (contacts, total) = service
        .list_contacts(query, page.limit(), page.skip())
        .await?;

    let now = Utc::now();
    let listings: Vec<Value> = contacts.iter().map(|c| c.listing_view(now)).collect();

    Ok(success(json!({
        "contacts": listings,
        "pagination": Pagination::new(page.page(), page.limit(), total)
    })))
}

#[axum::debug_handler]
pub async fn pending_contacts(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let service = InboxService::new(&state);

    let pending = service.pending_inquiries().await?;

    let now = Utc::now();
    let listings: Vec<Value> = pending.iter().map(|c| c.listing_view(now)).collect();

    Ok(success(json!({
        "pendingInquiries": listings,
        "count": listings.len()
    })))
}

#[axum::debug_handler]
pub async fn contact_stats(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ContactStatsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = InboxService::new(&state);

    let summary = service.stats_summary(query).await?;

    Ok(success(json!({ "summary": summary })))
}

#[axum::debug_handler]
pub async fn get_contact(
    State(state): State<Arc<AppConfig>>,
    Path(contact_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = InboxService::new(&state);

    let contact = service.get_contact(contact_id).await?;

    Ok(success(json!({ "contact": contact.detail_view(Utc::now()) })))
}

#[axum::debug_handler]
pub async fn update_contact_status(
    State(state): State<Arc<AppConfig>>,
    Path(contact_id): Path<Uuid>,
    Json(request): Json<UpdateContactStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InboxService::new(&state);

    let contact = service.update_status(contact_id, request).await?;

    Ok(success_with_message(
        "Contact inquiry status updated successfully",
        json!({ "contact": contact.detail_view(Utc::now()) }),
    ))
}

#[axum::debug_handler]
pub async fn respond_to_contact(
    State(state): State<Arc<AppConfig>>,
    Path(contact_id): Path<Uuid>,
    Json(request): Json<RespondRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InboxService::new(&state);

    let contact = service.respond(contact_id, request).await?;

    Ok(success_with_message(
        "Response sent successfully",
        json!({ "contact": contact.detail_view(Utc::now()) }),
    ))
}

#[axum::debug_handler]
pub async fn resolve_contact(
    State(state): State<Arc<AppConfig>>,
    Path(contact_id): Path<Uuid>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InboxService::new(&state);

    let contact = service.resolve(contact_id, request).await?;

    Ok(success_with_message(
        "Contact inquiry resolved successfully",
        json!({ "contact": contact.detail_view(Utc::now()) }),
    ))
}
