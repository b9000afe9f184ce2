use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::DocumentStore;
use shared_utils::password;

use crate::models::{CreateDoctorRequest, Doctor, DoctorError, DoctorSummary, SlotsBooked};

const COLLECTION: &str = "doctors";

pub struct DoctorDirectoryService {
    store: Arc<DocumentStore>,
}

impl DoctorDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(DocumentStore::new(config)),
        }
    }

    pub fn with_store(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a doctor profile with an empty availability record.
    pub async fn add_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        let name = required(request.name, "name")?;
        let email = required(request.email, "email")?;
        let raw_password = required(request.password, "password")?;
        let speciality = required(request.speciality, "speciality")?;
        let degree = required(request.degree, "degree")?;
        let experience = required(request.experience, "experience")?;
        let about = required(request.about, "about")?;
        let fees = request
            .fees
            .ok_or_else(|| DoctorError::Validation("Missing field: fees".to_string()))?;
        let address = request.address.unwrap_or_else(|| json!({}));

        if !is_plausible_email(&email) {
            return Err(DoctorError::Validation("Enter a valid email".to_string()));
        }
        if !password::is_strong_enough(&raw_password) {
            return Err(DoctorError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self.find_by_email(&email).await?.is_some() {
            return Err(DoctorError::EmailExists);
        }

        let password_hash = password::hash_password(&raw_password)
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let doctor_data = json!({
            "id": Uuid::new_v4(),
            "name": name,
            "email": email,
            "password_hash": password_hash,
            "image": request.image,
            "speciality": speciality,
            "degree": degree,
            "experience": experience,
            "about": about,
            "fees": fees,
            "address": address,
            "available": true,
            "slots_booked": SlotsBooked::new(),
            "created_at": Utc::now().to_rfc3339(),
        });

        let created = self
            .store
            .insert(COLLECTION, doctor_data)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let doctor: Doctor = serde_json::from_value(created)
            .map_err(|e| DoctorError::Database(format!("Failed to parse created doctor: {}", e)))?;

        info!("Doctor {} added to directory", doctor.id);
        Ok(doctor)
    }

    /// Public listing: credentials and email stripped.
    pub async fn list_doctors(&self) -> Result<Vec<DoctorSummary>, DoctorError> {
        debug!("Listing doctor directory");

        let result = self
            .store
            .find(COLLECTION, "order=created_at.asc")
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let doctors = result
            .into_iter()
            .map(serde_json::from_value::<Doctor>)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| DoctorError::Database(format!("Failed to parse doctors: {}", e)))?;

        Ok(doctors.into_iter().map(DoctorSummary::from).collect())
    }

    pub async fn get_doctor(&self, doctor_id: &str) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        let result = self
            .store
            .find_by_id(COLLECTION, doctor_id)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let value = result.ok_or(DoctorError::NotFound)?;
        serde_json::from_value(value)
            .map_err(|e| DoctorError::Database(format!("Failed to parse doctor: {}", e)))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, DoctorError> {
        let filter = format!("email=eq.{}", email);
        let result = self
            .store
            .find(COLLECTION, &filter)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        match result.into_iter().next() {
            Some(value) => {
                let doctor = serde_json::from_value(value)
                    .map_err(|e| DoctorError::Database(format!("Failed to parse doctor: {}", e)))?;
                Ok(Some(doctor))
            }
            None => Ok(None),
        }
    }

    /// Flip the accepting-bookings flag. Returns the new value.
    pub async fn toggle_availability(&self, doctor_id: &str) -> Result<bool, DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;
        let now_available = !doctor.available;

        self.store
            .update_by_id(COLLECTION, doctor_id, json!({ "available": now_available }))
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        info!("Doctor {} availability set to {}", doctor_id, now_available);
        Ok(now_available)
    }

    /// Persist a mutated availability record. The appointment cell owns
    /// every mutation of `slots_booked`; this is its write path.
    pub async fn save_slots_booked(
        &self,
        doctor_id: &str,
        slots_booked: &SlotsBooked,
    ) -> Result<(), DoctorError> {
        let patch: Value = json!({ "slots_booked": slots_booked });
        self.store
            .update_by_id(COLLECTION, doctor_id, patch)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))
    }
}

fn required(field: Option<String>, name: &str) -> Result<String, DoctorError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DoctorError::Validation(format!("Missing field: {}", name))),
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
