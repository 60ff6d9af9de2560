//! Wire types exchanged with the clinic backend
//!
//! Field names follow the backend's JSON (`snake_case`). Response types are
//! decoded as-is; no client-side reshaping happens beyond serde defaults.

pub mod issue;
pub mod patient;
pub mod treatment;
pub mod user;

use serde::{Deserialize, Serialize};

pub use issue::{IssueCreated, IssuePriority, IssueReport, IssueType};
pub use patient::{NewPatient, Patient, PatientEnvelope, PatientList, PatientUpdate};
pub use treatment::{NewTreatment, Treatment, TreatmentUpdate};
pub use user::{Credentials, LoginResponse, Message, NewUser, PasswordChange, UserInfo, UserUpdate};

/// UI language. Controls the export document's language and text direction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    He,
}

impl Language {
    /// Query-string code sent to the backend (`en`, `he`).
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::He => "he",
        }
    }

    /// Hebrew is laid out right-to-left.
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::He)
    }

    /// Parses a language code, ignoring case and region suffixes (`he-IL`).
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.split(['-', '_']).next()?.trim().to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Language::En),
            "he" | "iw" => Some(Language::He),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A downloaded patient export.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    /// From `Content-Disposition`, or a default when the header is absent.
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: bytes::Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_code() {
        assert_eq!(Language::from_code("en"), Some(Language::En));
        assert_eq!(Language::from_code("he-IL"), Some(Language::He));
        assert_eq!(Language::from_code("HE"), Some(Language::He));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn test_language_direction() {
        assert!(Language::He.is_rtl());
        assert!(!Language::En.is_rtl());
    }
}
