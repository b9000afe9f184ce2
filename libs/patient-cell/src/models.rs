use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub image: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Value>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile update. Every field is required; a partial submission is
/// rejected before any write happens.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Value>,
    pub dob: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("User not found")]
    NotFound,

    #[error("An account with this email already exists")]
    EmailExists,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::EmailExists => AppError::Conflict(err.to_string()),
            PatientError::Validation(msg) => AppError::BadRequest(msg),
            PatientError::Database(msg) => AppError::Database(msg),
        }
    }
}
