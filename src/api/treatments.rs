//! Treatments, nested under their patient

use reqwest::Method;
use uuid::Uuid;

use crate::api::{decode, expect_success, ApiClient};
use crate::error::{ClinicError, Result};
use crate::models::{NewTreatment, Treatment, TreatmentUpdate};

/// Client for `/patients/{id}/treatments` and `/treatments`.
#[derive(Debug, Clone)]
pub struct TreatmentsClient {
    api: ApiClient,
}

fn treatments_path(patient_id: Uuid) -> String {
    format!("patients/{}/treatments", patient_id)
}

fn treatment_path(patient_id: Uuid, treatment_id: Uuid) -> String {
    format!("patients/{}/treatments/{}", patient_id, treatment_id)
}

impl TreatmentsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /treatments`: every treatment across all patients.
    pub async fn list_all(&self) -> Result<Vec<Treatment>> {
        let request = self.api.request(Method::GET, "treatments");
        decode(self.api.execute(request).await?).await
    }

    /// `GET /patients/{pid}/treatments`
    pub async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Treatment>> {
        let request = self.api.request(Method::GET, &treatments_path(patient_id));
        decode(self.api.execute(request).await?).await
    }

    /// `GET /patients/{pid}/treatments/{tid}`
    pub async fn get(&self, patient_id: Uuid, treatment_id: Uuid) -> Result<Treatment> {
        let request = self
            .api
            .request(Method::GET, &treatment_path(patient_id, treatment_id));
        decode(self.api.execute(request).await?).await
    }

    /// `POST /patients/{pid}/treatments`
    pub async fn create(&self, patient_id: Uuid, treatment: &NewTreatment) -> Result<Treatment> {
        if treatment.summary.trim().is_empty() {
            return Err(ClinicError::Validation("treatment summary is required".into()).into());
        }
        let request = self
            .api
            .request(Method::POST, &treatments_path(patient_id))
            .json(treatment)?;
        decode(self.api.execute(request).await?).await
    }

    /// `PUT /patients/{pid}/treatments/{tid}`
    pub async fn update(
        &self,
        patient_id: Uuid,
        treatment_id: Uuid,
        changes: &TreatmentUpdate,
    ) -> Result<Treatment> {
        let request = self
            .api
            .request(Method::PUT, &treatment_path(patient_id, treatment_id))
            .json(changes)?;
        decode(self.api.execute(request).await?).await
    }

    /// `DELETE /patients/{pid}/treatments/{tid}`. The server answers
    /// `204 No Content`; returns `true` on success.
    pub async fn delete(&self, patient_id: Uuid, treatment_id: Uuid) -> Result<bool> {
        let request = self
            .api
            .request(Method::DELETE, &treatment_path(patient_id, treatment_id));
        expect_success(self.api.execute(request).await?).await
    }
}
