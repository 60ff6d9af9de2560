//! Patient records and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_active() -> bool {
    true
}

/// A patient file as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    /// Closed files are inactive; servers that predate the flag omit it.
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Body of `POST /patients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub description: String,
    /// Server uses the current time when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl NewPatient {
    /// Checks the fields the backend requires to be present.
    pub fn validate(&self) -> crate::Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone_number", &self.phone_number),
        ] {
            if value.trim().is_empty() {
                return Err(crate::ClinicError::Validation(format!("{} is required", field)).into());
            }
        }
        Ok(())
    }
}

/// Body of `PUT /patients/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl PatientUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}

/// Response of `GET /patients`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientList {
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub count: usize,
}

/// Response of create, update and toggle-status calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientEnvelope {
    #[serde(default)]
    pub message: String,
    pub patient: Patient,
}
