use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::{Doctor, DoctorError, SlotTime};
use doctor_cell::services::directory::DoctorDirectoryService;
use shared_config::AppConfig;
use shared_database::store::DocumentStore;
use shared_models::auth::{AuthUser, Role};

use crate::models::{Appointment, AppointmentError, BookAppointmentRequest};

const COLLECTION: &str = "appointments";
const PATIENTS: &str = "patients";

pub struct AppointmentBookingService {
    store: Arc<DocumentStore>,
    directory: DoctorDirectoryService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let store = Arc::new(DocumentStore::new(config));
        let directory = DoctorDirectoryService::with_store(Arc::clone(&store));
        Self { store, directory }
    }

    /// Book a slot with a doctor on behalf of the authenticated patient.
    ///
    /// Order matters: every check runs against freshly loaded documents, the
    /// doctor's availability record is written first and the ledger entry
    /// second. There is no transaction or compensating rollback between the
    /// two writes, and no lock around the conflict check; concurrent bookings
    /// of the same slot race on the read-check-write window.
    pub async fn book(
        &self,
        user_id: &str,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let doc_id = required(request.doc_id, "doc_id")?;
        let slot_date = parse_slot_date(request.slot_date)?;
        let slot_time = parse_slot_time(request.slot_time)?;

        let doctor = self.load_doctor(&doc_id).await?;

        if !doctor.available {
            return Err(AppointmentError::DoctorUnavailable);
        }
        if !doctor.slots_booked.is_free(slot_date, slot_time) {
            return Err(AppointmentError::SlotTaken);
        }

        let user_data = self.load_patient_snapshot(user_id).await?;

        let mut slots = doctor.slots_booked.clone();
        slots.reserve(slot_date, slot_time);
        self.directory
            .save_slots_booked(&doc_id, &slots)
            .await
            .map_err(doctor_error)?;

        let appointment_data = json!({
            "id": Uuid::new_v4(),
            "user_id": user_id,
            "doctor_id": doc_id,
            "user_data": user_data,
            "doc_data": doctor.snapshot(),
            "amount": doctor.fees,
            "slot_date": slot_date,
            "slot_time": slot_time,
            "created_at": Utc::now().to_rfc3339(),
            "cancelled": false,
            "is_completed": false,
            "paid": false,
        });

        let created = self
            .store
            .insert(COLLECTION, appointment_data)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let appointment: Appointment = serde_json::from_value(created).map_err(|e| {
            AppointmentError::Database(format!("Failed to parse created appointment: {}", e))
        })?;

        info!(
            "Appointment {} booked: doctor {} on {} at {}",
            appointment.id, doc_id, slot_date, slot_time
        );
        Ok(appointment)
    }

    /// Cancel an appointment and release its slot.
    ///
    /// Patients may only cancel their own appointments; the admin path skips
    /// the ownership check entirely. Completed appointments refuse
    /// cancellation. Cancelling twice is a no-op that still succeeds.
    pub async fn cancel(
        &self,
        user: &AuthUser,
        appointment_id: &str,
    ) -> Result<(), AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;

        match user.role {
            Role::Admin => {}
            Role::Patient if appointment.user_id == user.id => {}
            _ => return Err(AppointmentError::Unauthorized),
        }

        if appointment.is_completed {
            return Err(AppointmentError::InvalidState(
                "Completed appointments cannot be cancelled".to_string(),
            ));
        }
        if appointment.cancelled {
            debug!("Appointment {} already cancelled", appointment_id);
            return Ok(());
        }

        self.store
            .update_by_id(COLLECTION, appointment_id, json!({ "cancelled": true }))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        self.release_slot(&appointment).await;

        info!("Appointment {} cancelled by {}", appointment_id, user.role);
        Ok(())
    }

    /// Mark an appointment completed. Only the doctor it belongs to may do
    /// this, and a cancelled appointment stays cancelled.
    pub async fn complete(
        &self,
        doctor: &AuthUser,
        appointment_id: &str,
    ) -> Result<(), AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;

        if appointment.doctor_id != doctor.id {
            return Err(AppointmentError::Unauthorized);
        }
        if appointment.cancelled {
            return Err(AppointmentError::InvalidState(
                "Cancelled appointments cannot be completed".to_string(),
            ));
        }
        if appointment.is_completed {
            debug!("Appointment {} already completed", appointment_id);
            return Ok(());
        }

        self.store
            .update_by_id(COLLECTION, appointment_id, json!({ "is_completed": true }))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        info!("Appointment {} completed", appointment_id);
        Ok(())
    }

    pub async fn get_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<Appointment, AppointmentError> {
        let value = self
            .store
            .find_by_id(COLLECTION, appointment_id)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?
            .ok_or(AppointmentError::NotFound)?;

        serde_json::from_value(value).map_err(|e| {
            AppointmentError::Database(format!("Failed to parse appointment: {}", e))
        })
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let filter = format!("user_id=eq.{}&order=created_at.desc", user_id);
        self.list(&filter).await
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let filter = format!("doctor_id=eq.{}&order=created_at.desc", doctor_id);
        self.list(&filter).await
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.list("order=created_at.desc").await
    }

    async fn list(&self, filter: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let result = self
            .store
            .find(COLLECTION, filter)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        result
            .into_iter()
            .map(|value| {
                serde_json::from_value(value).map_err(|e| {
                    AppointmentError::Database(format!("Failed to parse appointment: {}", e))
                })
            })
            .collect()
    }

    async fn load_doctor(&self, doc_id: &str) -> Result<Doctor, AppointmentError> {
        self.directory.get_doctor(doc_id).await.map_err(|e| match e {
            DoctorError::NotFound => AppointmentError::DoctorNotFound,
            other => AppointmentError::Database(other.to_string()),
        })
    }

    async fn load_patient_snapshot(&self, user_id: &str) -> Result<Value, AppointmentError> {
        let mut patient = self
            .store
            .find_by_id(PATIENTS, user_id)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?
            .ok_or(AppointmentError::UserNotFound)?;

        // Snapshot travels inside the ledger entry; never carry credentials.
        if let Some(doc) = patient.as_object_mut() {
            doc.remove("password_hash");
        }
        Ok(patient)
    }

    /// Slot release runs after the ledger write. A failure here leaves the
    /// slot reserved with the appointment already cancelled; the divergence
    /// is logged rather than retried.
    async fn release_slot(&self, appointment: &Appointment) {
        let doctor = match self.directory.get_doctor(&appointment.doctor_id).await {
            Ok(doctor) => doctor,
            Err(e) => {
                warn!(
                    "Could not load doctor {} to release slot: {}",
                    appointment.doctor_id, e
                );
                return;
            }
        };

        let mut slots = doctor.slots_booked.clone();
        slots.release(appointment.slot_date, appointment.slot_time);

        if let Err(e) = self
            .directory
            .save_slots_booked(&appointment.doctor_id, &slots)
            .await
        {
            warn!(
                "Could not release slot {} {} for doctor {}: {}",
                appointment.slot_date, appointment.slot_time, appointment.doctor_id, e
            );
        }
    }
}

fn doctor_error(e: DoctorError) -> AppointmentError {
    AppointmentError::Database(e.to_string())
}

fn required(field: Option<String>, name: &str) -> Result<String, AppointmentError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppointmentError::Validation(format!(
            "Missing field: {}",
            name
        ))),
    }
}

fn parse_slot_date(raw: Option<String>) -> Result<NaiveDate, AppointmentError> {
    let raw = required(raw, "slot_date")?;
    raw.parse().map_err(|_| {
        AppointmentError::Validation(format!("Invalid slot_date: {}", raw))
    })
}

fn parse_slot_time(raw: Option<String>) -> Result<SlotTime, AppointmentError> {
    let raw = required(raw, "slot_time")?;
    raw.parse().map_err(|_| {
        AppointmentError::Validation(format!("Invalid slot_time: {}", raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_date_must_be_iso() {
        assert!(parse_slot_date(Some("2024-06-10".to_string())).is_ok());
        assert!(parse_slot_date(Some("10_6_2024".to_string())).is_err());
        assert!(parse_slot_date(None).is_err());
    }

    #[test]
    fn slot_time_must_be_twelve_hour() {
        assert!(parse_slot_time(Some("10:00 AM".to_string())).is_ok());
        assert!(parse_slot_time(Some("8:30 PM".to_string())).is_ok());
        assert!(parse_slot_time(Some("25:00".to_string())).is_err());
        assert!(parse_slot_time(Some("".to_string())).is_err());
    }
}
