use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use shared_config::AppConfig;
use shared_database::store::DocumentStore;

use crate::models::{AdminDashboard, Appointment, AppointmentError, DoctorDashboard};

const LATEST_COUNT: usize = 5;

pub struct DashboardService {
    store: Arc<DocumentStore>,
}

impl DashboardService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(DocumentStore::new(config)),
        }
    }

    /// Clinic-wide counters plus the five most recent bookings.
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, AppointmentError> {
        debug!("Building admin dashboard");

        let doctors = self.count("doctors").await?;
        let patients = self.count("patients").await?;
        let appointments = self.fetch_appointments("order=created_at.desc").await?;

        Ok(AdminDashboard {
            doctors,
            patients,
            appointments: appointments.len(),
            latest_appointments: appointments.into_iter().take(LATEST_COUNT).collect(),
        })
    }

    /// Per-doctor earnings and patient counters. Earnings sum the amounts of
    /// appointments that are completed or paid; cancelled ones still count
    /// once they were paid.
    pub async fn doctor_dashboard(
        &self,
        doctor_id: &str,
    ) -> Result<DoctorDashboard, AppointmentError> {
        debug!("Building dashboard for doctor {}", doctor_id);

        let filter = format!("doctor_id=eq.{}&order=created_at.desc", doctor_id);
        let appointments = self.fetch_appointments(&filter).await?;

        let earnings: f64 = appointments
            .iter()
            .filter(|a| a.is_completed || a.paid)
            .map(|a| a.amount)
            .sum();

        let patients: BTreeSet<&str> = appointments.iter().map(|a| a.user_id.as_str()).collect();

        Ok(DoctorDashboard {
            earnings,
            appointments: appointments.len(),
            patients: patients.len(),
            latest_appointments: appointments.into_iter().take(LATEST_COUNT).collect(),
        })
    }

    async fn count(&self, collection: &str) -> Result<usize, AppointmentError> {
        let result = self
            .store
            .find(collection, "select=id")
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;
        Ok(result.len())
    }

    async fn fetch_appointments(
        &self,
        filter: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let result = self
            .store
            .find("appointments", filter)
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
}
