//! Issue reports forwarded by the backend to the project's GitHub tracker

use serde::{Deserialize, Serialize};

use crate::error::{ClinicError, Result};

/// Kind of report; the backend turns it into `type:*` labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    #[default]
    Bug,
    Feature,
    Enhancement,
}

/// Urgency of a report; the backend turns it into `priority:*` labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Body of `POST /github/issues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueReport {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub priority: IssuePriority,
}

impl IssueReport {
    /// Rejects reports with a blank title or description.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ClinicError::Validation("issue title is required".into()).into());
        }
        if self.description.trim().is_empty() {
            return Err(ClinicError::Validation("issue description is required".into()).into());
        }
        Ok(())
    }
}

/// Backend acknowledgement of a created issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCreated {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub issue_number: Option<u32>,
}
