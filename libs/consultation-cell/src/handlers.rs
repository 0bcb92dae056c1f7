use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::api::{success, success_with_message, PageQuery, Pagination};
use shared_models::error::AppError;

use crate::models::{
    AssessmentRequest, ConsultationStatsQuery, CreateConsultationRequest,
    DoctorConsultationsQuery, PrescriptionRequest, UpdateConsultationRequest,
};
use crate::services::consultation::ConsultationService;

#[axum::debug_handler]
pub async fn create_consultation(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateConsultationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = ConsultationService::new(&state);

    let consultation = service.create_consultation(request).await?;

    Ok((
        StatusCode::CREATED,
        success_with_message(
            "Consultation scheduled successfully",
            json!({ "consultation": consultation.summary() }),
        ),
    ))
}

#[axum::debug_handler]
pub async fn get_doctor_consultations(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
    Query(query): Query<DoctorConsultationsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&state);

    let (consultations, total) = service
        .list_for_doctor(doctor_id, query, page.limit(), page.skip())
        .await?;

    Ok(success(json!({
        "consultations": consultations,
        "pagination": Pagination::new(page.page(), page.limit(), total)
    })))
}

#[axum::debug_handler]
pub async fn get_consultation(
    State(state): State<Arc<AppConfig>>,
    Path(consultation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&state);

    let consultation = service.get_consultation(consultation_id).await?;

    Ok(success(json!({ "consultation": consultation })))
}

#[axum::debug_handler]
pub async fn update_consultation(
    State(state): State<Arc<AppConfig>>,
    Path(consultation_id): Path<Uuid>,
    Json(request): Json<UpdateConsultationRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&state);

    let consultation = service.update_consultation(consultation_id, request).await?;

    Ok(success_with_message(
        "Consultation updated successfully",
        json!({ "consultation": consultation }),
    ))
}

#[axum::debug_handler]
pub async fn add_prescription(
    State(state): State<Arc<AppConfig>>,
    Path(consultation_id): Path<Uuid>,
    Json(request): Json<PrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&state);

    let consultation = service.add_prescription(consultation_id, request).await?;

    Ok(success_with_message(
        "Prescription added successfully",
        json!({ "consultation": consultation }),
    ))
}

#[axum::debug_handler]
pub async fn add_assessment(
    State(state): State<Arc<AppConfig>>,
    Path(consultation_id): Path<Uuid>,
    Json(request): Json<AssessmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&state);

    let consultation = service.add_assessment(consultation_id, request).await?;

    Ok(success_with_message(
        "Ayurvedic assessment added successfully",
        json!({ "consultation": consultation }),
    ))
}

#[axum::debug_handler]
pub async fn consultation_stats(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<ConsultationStatsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ConsultationService::new(&state);

    let summary = service.stats_summary(query).await?;

    Ok(success(json!({ "summary": summary })))
}
