use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::api::{success, success_with_message, PageQuery, Pagination};
use shared_models::error::AppError;

use crate::models::{
    BookAppointmentRequest, CancelRequest, DoctorAppointmentsQuery, PatientAppointmentsQuery,
    RescheduleRequest, UpdateStatusRequest,
};
use crate::services::{booking::BookingService, slots::SlotService};

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = BookingService::new(&state);

    let appointment = service.create_appointment(request).await?;

    Ok((
        StatusCode::CREATED,
        success_with_message(
            "Appointment scheduled successfully",
            json!({ "appointment": appointment.summary() }),
        ),
    ))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
    Query(query): Query<DoctorAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let (appointments, total) = service
        .list_for_doctor(doctor_id, query, page.limit(), page.skip())
        .await?;

    Ok(success(json!({
        "appointments": appointments,
        "pagination": Pagination::new(page.page(), page.limit(), total)
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(email): Path<String>,
    Query(page): Query<PageQuery>,
    Query(query): Query<PatientAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let (appointments, total) = service
        .list_for_patient(&email, query, page.limit(), page.skip())
        .await?;

    Ok(success(json!({
        "appointments": appointments,
        "pagination": Pagination::new(page.page(), page.limit(), total)
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service.get_appointment(appointment_id).await?;

    Ok(success(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service.update_status(appointment_id, request).await?;

    Ok(success_with_message(
        "Appointment status updated successfully",
        json!({ "appointment": appointment }),
    ))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service.reschedule(appointment_id, request).await?;

    Ok(success_with_message(
        "Appointment rescheduled successfully",
        json!({ "appointment": appointment }),
    ))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service.cancel(appointment_id, request).await?;

    Ok(success_with_message(
        "Appointment cancelled successfully",
        json!({ "appointment": appointment }),
    ))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path((doctor_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<Value>, AppError> {
    let service = SlotService::new(&state);

    let slots = service.available_slots(doctor_id, date).await?;

    Ok(success(json!({
        "date": slots.date,
        "dayName": slots.day_name,
        "availableSlots": slots.available_slots,
        "totalSlots": slots.total_slots,
        "bookedSlots": slots.booked_slots
    })))
}
