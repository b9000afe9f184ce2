use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;

use crate::models::{ChangeAvailabilityRequest, CreateDoctorRequest};
use crate::services::directory::DoctorDirectoryService;
use crate::services::slots::generate_slots;

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let directory = DoctorDirectoryService::new(&state);

    let doctors = directory.list_doctors().await?;

    Ok(Json(json!({
        "success": true,
        "doctors": doctors,
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = DoctorDirectoryService::new(&state);

    let doctor = directory.get_doctor(&doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "doctor": crate::models::DoctorSummary::from(doctor),
    })))
}

/// Offerable slots over the booking window, server-computed from the
/// doctor's availability record.
#[axum::debug_handler]
pub async fn get_doctor_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = DoctorDirectoryService::new(&state);

    let doctor = directory.get_doctor(&doctor_id).await?;
    if !doctor.available {
        return Err(AppError::BadRequest("Doctor not available".to_string()));
    }

    let days = generate_slots(Utc::now(), &doctor.slots_booked);

    Ok(Json(json!({
        "success": true,
        "slots": days,
    })))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn add_doctor(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    shared_utils::extractor::require_role(&user, Role::Admin)?;

    let directory = DoctorDirectoryService::new(&state);
    let doctor = directory.add_doctor(request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Doctor Added",
        "doctor_id": doctor.id,
    })))
}

/// Doctors flip their own flag; admins may flip anyone's by passing doc_id.
#[axum::debug_handler]
pub async fn change_availability(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ChangeAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = match user.role {
        Role::Admin => request
            .doc_id
            .ok_or_else(|| AppError::BadRequest("Missing field: doc_id".to_string()))?,
        Role::Doctor => {
            if let Some(requested) = request.doc_id {
                if requested != user.id {
                    return Err(AppError::Forbidden(
                        "Doctors can only change their own availability".to_string(),
                    ));
                }
            }
            user.id.clone()
        }
        Role::Patient => {
            return Err(AppError::Forbidden(
                "Insufficient permissions".to_string(),
            ))
        }
    };

    let directory = DoctorDirectoryService::new(&state);
    let available = directory.toggle_availability(&doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Availability Changed",
        "available": available,
    })))
}
