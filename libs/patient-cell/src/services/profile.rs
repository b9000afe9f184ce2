use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::DocumentStore;
use shared_utils::password;

use crate::models::{Patient, PatientError, UpdateProfileRequest};

const COLLECTION: &str = "patients";

pub struct ProfileService {
    store: Arc<DocumentStore>,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(DocumentStore::new(config)),
        }
    }

    pub fn with_store(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Create an account document. Caller has already validated the input;
    /// the duplicate-email check happens here because registration is the
    /// only write path for new patients.
    pub async fn create_patient(
        &self,
        name: &str,
        email: &str,
        raw_password: &str,
    ) -> Result<Patient, PatientError> {
        if self.find_by_email(email).await?.is_some() {
            return Err(PatientError::EmailExists);
        }

        let password_hash = password::hash_password(raw_password)
            .map_err(|e| PatientError::Database(e.to_string()))?;

        let patient_data = json!({
            "id": Uuid::new_v4(),
            "name": name,
            "email": email,
            "password_hash": password_hash,
            "created_at": Utc::now().to_rfc3339(),
        });

        let created = self
            .store
            .insert(COLLECTION, patient_data)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        let patient: Patient = serde_json::from_value(created)
            .map_err(|e| PatientError::Database(format!("Failed to parse created patient: {}", e)))?;

        info!("Patient {} registered", patient.id);
        Ok(patient)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Patient, PatientError> {
        debug!("Fetching profile for {}", user_id);

        let value = self
            .store
            .find_by_id(COLLECTION, user_id)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?
            .ok_or(PatientError::NotFound)?;

        serde_json::from_value(value)
            .map_err(|e| PatientError::Database(format!("Failed to parse patient: {}", e)))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, PatientError> {
        let filter = format!("email=eq.{}", email);
        let result = self
            .store
            .find(COLLECTION, &filter)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        match result.into_iter().next() {
            Some(value) => {
                let patient = serde_json::from_value(value)
                    .map_err(|e| PatientError::Database(format!("Failed to parse patient: {}", e)))?;
                Ok(Some(patient))
            }
            None => Ok(None),
        }
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> Result<(), PatientError> {
        let name = required(request.name, "name")?;
        let phone = required(request.phone, "phone")?;
        let dob = required(request.dob, "dob")?;
        let gender = required(request.gender, "gender")?;
        let address = request
            .address
            .ok_or_else(|| PatientError::Validation("Missing field: address".to_string()))?;

        // Existence check keeps a typo'd id from silently patching nothing.
        self.get_profile(user_id).await?;

        let patch = json!({
            "name": name,
            "phone": phone,
            "address": address,
            "dob": dob,
            "gender": gender,
        });

        self.store
            .update_by_id(COLLECTION, user_id, patch)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        info!("Profile updated for {}", user_id);
        Ok(())
    }
}

fn required(field: Option<String>, name: &str) -> Result<String, PatientError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PatientError::Validation(format!("Missing field: {}", name))),
    }
}
