use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use uuid::Uuid;

// ==============================================================================
// SLOT TIME
// ==============================================================================

/// A bookable time of day, serialized in the 12-hour form patients see,
/// e.g. `"10:00 AM"`. Ordering is chronological, not lexical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotTime(NaiveTime);

impl SlotTime {
    pub fn new(time: NaiveTime) -> Self {
        Self(time)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%-I:%M %p"))
    }
}

impl FromStr for SlotTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%I:%M %p").map(Self)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ==============================================================================
// AVAILABILITY RECORD
// ==============================================================================

/// Per-doctor map of booked slots, keyed by calendar date. Set semantics:
/// a time appears at most once per date, and a date with no booked times
/// has no key at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotsBooked(BTreeMap<NaiveDate, BTreeSet<SlotTime>>);

impl SlotsBooked {
    pub fn new() -> Self {
        Self::default()
    }

    /// The booking conflict check: free unless the date holds this time.
    pub fn is_free(&self, date: NaiveDate, time: SlotTime) -> bool {
        self.0.get(&date).map_or(true, |times| !times.contains(&time))
    }

    /// Reserve a slot. Returns false when it was already taken.
    pub fn reserve(&mut self, date: NaiveDate, time: SlotTime) -> bool {
        self.0.entry(date).or_default().insert(time)
    }

    /// Release a slot, dropping the date key once its set empties.
    /// Releasing an absent slot is a no-op.
    pub fn release(&mut self, date: NaiveDate, time: SlotTime) {
        if let Some(times) = self.0.get_mut(&date) {
            times.remove(&time);
            if times.is_empty() {
                self.0.remove(&date);
            }
        }
    }

    pub fn booked_on(&self, date: NaiveDate) -> Option<&BTreeSet<SlotTime>> {
        self.0.get(&date)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

// ==============================================================================
// DOCTOR MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub image: Option<String>,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: f64,
    pub address: Value,
    pub available: bool,
    #[serde(default)]
    pub slots_booked: SlotsBooked,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    /// Display snapshot denormalized into appointment records. Excludes the
    /// live availability record and all credentials.
    pub fn snapshot(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "image": self.image,
            "speciality": self.speciality,
            "degree": self.degree,
            "experience": self.experience,
            "fees": self.fees,
            "address": self.address,
        })
    }
}

/// Public projection: what the patient-facing listing exposes. No email,
/// no credentials; the availability record travels along so clients can
/// run slot generation themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: f64,
    pub address: Value,
    pub available: bool,
    pub slots_booked: SlotsBooked,
}

impl From<Doctor> for DoctorSummary {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            image: doctor.image,
            speciality: doctor.speciality,
            degree: doctor.degree,
            experience: doctor.experience,
            about: doctor.about,
            fees: doctor.fees,
            address: doctor.address,
            available: doctor.available,
            slots_booked: doctor.slots_booked,
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,
    pub speciality: Option<String>,
    pub degree: Option<String>,
    pub experience: Option<String>,
    pub about: Option<String>,
    pub fees: Option<f64>,
    pub address: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeAvailabilityRequest {
    pub doc_id: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("A doctor with this email already exists")]
    EmailExists,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DoctorError> for shared_models::error::AppError {
    fn from(err: DoctorError) -> Self {
        use shared_models::error::AppError;
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::EmailExists => AppError::Conflict(err.to_string()),
            DoctorError::Validation(msg) => AppError::BadRequest(msg),
            DoctorError::Database(msg) => AppError::Database(msg),
        }
    }
}
