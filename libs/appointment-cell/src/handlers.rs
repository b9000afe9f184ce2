use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;

use crate::models::{BookAppointmentRequest, CancelAppointmentRequest, CompleteAppointmentRequest};
use crate::services::booking::AppointmentBookingService;
use crate::services::dashboard::DashboardService;

// ==============================================================================
// PATIENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Patient)?;

    let service = AppointmentBookingService::new(&state);
    let appointment = service.book(&user.id, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment Booked",
        "appointment_id": appointment.id,
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Patient)?;

    let appointment_id = required_id(request.appointment_id)?;

    let service = AppointmentBookingService::new(&state);
    service.cancel(&user, &appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment Cancelled",
    })))
}

#[axum::debug_handler]
pub async fn list_user_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Patient)?;

    let service = AppointmentBookingService::new(&state);
    let appointments = service.list_for_user(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments,
    })))
}

// ==============================================================================
// DOCTOR HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Doctor)?;

    let service = AppointmentBookingService::new(&state);
    let appointments = service.list_for_doctor(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments,
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Doctor)?;

    let appointment_id = required_id(request.appointment_id)?;

    let service = AppointmentBookingService::new(&state);
    service.complete(&user, &appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment Completed",
    })))
}

#[axum::debug_handler]
pub async fn doctor_dashboard(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Doctor)?;

    let service = DashboardService::new(&state);
    let dashboard = service.doctor_dashboard(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "dashboard": dashboard,
    })))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_all_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Admin)?;

    let service = AppointmentBookingService::new(&state);
    let appointments = service.list_all().await?;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments,
    })))
}

/// Admin cancellation: same flow as the patient path minus the ownership
/// check. The role gate above is the only guard.
#[axum::debug_handler]
pub async fn admin_cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Admin)?;

    let appointment_id = required_id(request.appointment_id)?;

    let service = AppointmentBookingService::new(&state);
    service.cancel(&user, &appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment Cancelled",
    })))
}

#[axum::debug_handler]
pub async fn admin_dashboard(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Admin)?;

    let service = DashboardService::new(&state);
    let dashboard = service.admin_dashboard().await?;

    Ok(Json(json!({
        "success": true,
        "dashboard": dashboard,
    })))
}

fn required_id(field: Option<String>) -> Result<String, AppError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::BadRequest(
            "Missing field: appointment_id".to_string(),
        )),
    }
}
