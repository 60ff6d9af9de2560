//! Patient files: CRUD, open/close toggling and document export

use std::sync::OnceLock;

use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Method;
use uuid::Uuid;

use crate::api::{decode, error_message, expect_success, require, ApiClient};
use crate::error::{ClinicError, Result};
use crate::models::{
    ExportedDocument, Language, NewPatient, Patient, PatientEnvelope, PatientList, PatientUpdate,
};

/// Name used when the export response carries no usable filename.
pub const DEFAULT_EXPORT_FILENAME: &str = "patient_export.rtf";

const QUOTED_FILENAME: &str = r#"filename="([^"]+)""#;
const BARE_FILENAME: &str = r#"filename=([^;\s"]+)"#;

/// Client for `/patients`.
#[derive(Debug, Clone)]
pub struct PatientsClient {
    api: ApiClient,
}

impl PatientsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /patients`
    pub async fn list(&self) -> Result<PatientList> {
        let request = self.api.request(Method::GET, "patients");
        decode(self.api.execute(request).await?).await
    }

    /// `GET /patients/{id}`
    pub async fn get(&self, id: Uuid) -> Result<Patient> {
        let request = self.api.request(Method::GET, &format!("patients/{}", id));
        decode(self.api.execute(request).await?).await
    }

    /// `POST /patients`
    ///
    /// Required fields are checked locally first.
    pub async fn create(&self, patient: &NewPatient) -> Result<PatientEnvelope> {
        patient.validate()?;
        let request = self.api.request(Method::POST, "patients").json(patient)?;
        decode(self.api.execute(request).await?).await
    }

    /// `PUT /patients/{id}`
    pub async fn update(&self, id: Uuid, changes: &PatientUpdate) -> Result<PatientEnvelope> {
        let request = self
            .api
            .request(Method::PUT, &format!("patients/{}", id))
            .json(changes)?;
        decode(self.api.execute(request).await?).await
    }

    /// `DELETE /patients/{id}`. Returns `true` on success.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let request = self.api.request(Method::DELETE, &format!("patients/{}", id));
        expect_success(self.api.execute(request).await?).await
    }

    /// `PUT /patients/{id}/toggle-status`: closes an open file or reopens a
    /// closed one.
    pub async fn toggle_status(&self, id: Uuid) -> Result<PatientEnvelope> {
        let request = self
            .api
            .request(Method::PUT, &format!("patients/{}/toggle-status", id));
        decode(self.api.execute(request).await?).await
    }

    /// `GET /patients/{id}/export?lang=`: the patient file with treatments
    /// as a document in `language`.
    pub async fn export(&self, id: Uuid, language: Language) -> Result<ExportedDocument> {
        let request = self
            .api
            .request(Method::GET, &format!("patients/{}/export", id))
            .query("lang", language.code());
        let response = require(self.api.execute(request).await?)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(ClinicError::Api {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| "Failed to export patient data".to_string()),
            }
            .into());
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| DEFAULT_EXPORT_FILENAME.to_string());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClinicError::Network(format!("failed to download export: {}", e)))?;

        tracing::info!("Exported patient {} as {} ({} bytes)", id, filename, bytes.len());

        Ok(ExportedDocument {
            filename,
            content_type,
            bytes,
        })
    }
}

/// Pulls the filename out of a `Content-Disposition` header value.
///
/// Handles quoted and bare forms; path components are stripped so the
/// result is safe to join onto a download directory.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let raw = quoted_filename()
        .captures(header)
        .or_else(|| bare_filename().captures(header))?
        .get(1)?
        .as_str();

    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

fn quoted_filename() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(QUOTED_FILENAME).expect("quoted filename pattern compiles"))
}

fn bare_filename() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BARE_FILENAME).expect("bare filename pattern compiles"))
}
