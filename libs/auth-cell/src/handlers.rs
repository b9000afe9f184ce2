use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use doctor_cell::services::directory::DoctorDirectoryService;
use patient_cell::services::profile::ProfileService;
use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::{jwt, password};

use crate::models::{LoginRequest, RegisterRequest};

// Credential failures are deliberately indistinguishable: same message for
// an unknown email and a wrong password.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[axum::debug_handler]
pub async fn register_user(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    let name = required(request.name, "name")?;
    let email = required(request.email, "email")?;
    let raw_password = required(request.password, "password")?;

    if !is_plausible_email(&email) {
        return Err(AppError::BadRequest("Enter a valid email".to_string()));
    }
    if !password::is_strong_enough(&raw_password) {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let profiles = ProfileService::new(&state);
    let patient = profiles.create_patient(&name, &email, &raw_password).await?;

    let token = jwt::issue_token(
        &patient.id.to_string(),
        Role::Patient,
        Some(&patient.email),
        &state.jwt_secret,
    )
    .map_err(AppError::Internal)?;

    info!("Registered patient {}", patient.id);
    Ok(Json(json!({
        "success": true,
        "token": token,
    })))
}

#[axum::debug_handler]
pub async fn login_user(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let email = required(request.email, "email")?;
    let raw_password = required(request.password, "password")?;

    let profiles = ProfileService::new(&state);
    let patient = profiles
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS.to_string()))?;

    let verified = password::verify_password(&raw_password, &patient.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !verified {
        debug!("Password mismatch for patient login");
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    let token = jwt::issue_token(
        &patient.id.to_string(),
        Role::Patient,
        Some(&patient.email),
        &state.jwt_secret,
    )
    .map_err(AppError::Internal)?;

    Ok(Json(json!({
        "success": true,
        "token": token,
    })))
}

#[axum::debug_handler]
pub async fn login_doctor(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let email = required(request.email, "email")?;
    let raw_password = required(request.password, "password")?;

    let directory = DoctorDirectoryService::new(&state);
    let doctor = directory
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS.to_string()))?;

    let verified = password::verify_password(&raw_password, &doctor.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !verified {
        debug!("Password mismatch for doctor login");
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    let token = jwt::issue_token(
        &doctor.id.to_string(),
        Role::Doctor,
        Some(&doctor.email),
        &state.jwt_secret,
    )
    .map_err(AppError::Internal)?;

    Ok(Json(json!({
        "success": true,
        "token": token,
    })))
}

/// Admin credentials come from configuration, not the store.
#[axum::debug_handler]
pub async fn login_admin(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let email = required(request.email, "email")?;
    let raw_password = required(request.password, "password")?;

    if !state.is_admin_login_configured() {
        warn!("Admin login attempted without configured credentials");
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    if email != state.admin_email || raw_password != state.admin_password {
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    let token = jwt::issue_token(
        &state.admin_email,
        Role::Admin,
        Some(&state.admin_email),
        &state.jwt_secret,
    )
    .map_err(AppError::Internal)?;

    Ok(Json(json!({
        "success": true,
        "token": token,
    })))
}

fn required(field: Option<String>, name: &str) -> Result<String, AppError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::BadRequest(format!("Missing field: {}", name))),
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
