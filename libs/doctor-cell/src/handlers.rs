use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::api::{success, success_with_message, PageQuery, Pagination};
use shared_models::auth::TokenResponse;
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;

use crate::models::{
    DoctorListFilters, LoginRequest, RegisterDoctorRequest, UpdateDoctorRequest,
};
use crate::services::{directory::DirectoryService, registration::RegistrationService};

#[axum::debug_handler]
pub async fn register_doctor(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RegisterDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = RegistrationService::new(&state);

    let (doctor, token) = service.register(request).await?;

    Ok((
        StatusCode::CREATED,
        success_with_message(
            "Doctor registered successfully",
            json!({
                "doctor": doctor.summary(),
                "token": token
            }),
        ),
    ))
}

#[axum::debug_handler]
pub async fn login_doctor(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let service = RegistrationService::new(&state);

    let (doctor, token) = service.login(request).await?;

    Ok(success_with_message(
        "Login successful",
        json!({
            "doctor": doctor.summary(),
            "token": token
        }),
    ))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(page): Query<PageQuery>,
    Query(filters): Query<DoctorListFilters>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);

    let (doctors, total) = service
        .list_doctors(filters, page.limit(), page.skip())
        .await?;

    let listings: Vec<Value> = doctors.iter().map(|d| d.directory_view()).collect();

    Ok(success(json!({
        "doctors": listings,
        "pagination": Pagination::new(page.page(), page.limit(), total)
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);

    let doctor = service.get_doctor(doctor_id).await?;

    Ok(success(json!({ "doctor": doctor.public_view() })))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);

    let doctor = service.update_doctor(doctor_id, request).await?;

    Ok(success_with_message(
        "Doctor profile updated successfully",
        json!({ "doctor": doctor.directory_view() }),
    ))
}

#[axum::debug_handler]
pub async fn doctor_stats(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);

    let summary = service.stats_summary().await?;

    Ok(success(json!({ "summary": summary })))
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<AppConfig>>,
    Path(query): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(&state);

    let (doctors, total) = service
        .search_doctors(&query, page.limit(), page.skip())
        .await?;

    let listings: Vec<Value> = doctors.iter().map(|d| d.directory_view()).collect();

    Ok(success(json!({
        "doctors": listings,
        "pagination": Pagination::new(page.page(), page.limit(), total),
        "query": query
    })))
}

/// Check a bearer token issued at register/login. Most routes are public by
/// contract; this endpoint lets clients verify a stored session.
#[axum::debug_handler]
pub async fn validate_session(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let auth_header = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    let token = &auth_value[7..];
    let user = validate_token(token, &state.jwt_secret).map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        doctor_id: user.doctor_id,
        email: user.email,
    }))
}
