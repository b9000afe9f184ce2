use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use doctor_cell::models::SlotTime;
use shared_models::error::AppError;

// ==============================================================================
// LEDGER
// ==============================================================================

/// One appointment ledger entry. `user_data` and `doc_data` are display
/// snapshots taken at booking time; they never contain credentials or the
/// doctor's availability record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: String,
    pub doctor_id: String,
    pub user_data: Value,
    pub doc_data: Value,
    pub amount: f64,
    pub slot_date: NaiveDate,
    pub slot_time: SlotTime,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub paid: bool,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Fields arrive optional so that missing or malformed input surfaces as a
/// validation error in the uniform envelope instead of a rejected decode.
#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doc_id: Option<String>,
    pub slot_date: Option<String>,
    pub slot_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelAppointmentRequest {
    pub appointment_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteAppointmentRequest {
    pub appointment_id: Option<String>,
}

// ==============================================================================
// DASHBOARDS
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub doctors: usize,
    pub appointments: usize,
    pub patients: usize,
    pub latest_appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorDashboard {
    pub earnings: f64,
    pub appointments: usize,
    pub patients: usize,
    pub latest_appointments: Vec<Appointment>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not available")]
    DoctorUnavailable,

    #[error("Slot not available")]
    SlotTaken,

    #[error("Unauthorized action")]
    Unauthorized,

    #[error("{0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Validation(msg) => AppError::BadRequest(msg),
            AppointmentError::DoctorNotFound
            | AppointmentError::UserNotFound
            | AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::DoctorUnavailable => AppError::BadRequest(err.to_string()),
            AppointmentError::SlotTaken => AppError::Conflict(err.to_string()),
            AppointmentError::Unauthorized => AppError::Forbidden(err.to_string()),
            AppointmentError::InvalidState(msg) => AppError::Conflict(msg),
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}
