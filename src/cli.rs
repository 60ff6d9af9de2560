//! Command-line interface definition for the clinic client
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for session management and every backend resource.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::StoreKind;
use crate::models::{IssuePriority, IssueType, Language};

/// Clinic - patient and treatment management from the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "clinic")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/clinic.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the API base URL (e.g. http://127.0.0.1:8080/api)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Override where the session is stored
    #[arg(long, value_enum)]
    pub store: Option<StoreKind>,

    /// Override the language used for exports
    #[arg(long, value_enum)]
    pub lang: Option<Language>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and store the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "CLINIC_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session and whether it is still valid
    Whoami,

    /// Manage patient files
    Patients {
        #[command(subcommand)]
        command: PatientCommand,
    },

    /// Manage treatments
    Treatments {
        #[command(subcommand)]
        command: TreatmentCommand,
    },

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Report bugs and feature requests
    Issues {
        #[command(subcommand)]
        command: IssueCommand,
    },
}

/// Patient subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PatientCommand {
    /// List patients
    List {
        /// Only patients whose name contains this text (case-insensitive)
        #[arg(short, long)]
        name: Option<String>,

        /// Include closed (inactive) files
        #[arg(short = 'a', long)]
        include_inactive: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one patient
    Show {
        id: Uuid,

        #[arg(long)]
        json: bool,
    },

    /// Open a new patient file
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(long, default_value = "")]
        description: String,

        /// RFC 3339 timestamp or YYYY-MM-DD; defaults to now on the server
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },

    /// Change patient details
    Update {
        id: Uuid,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },

    /// Delete a patient and their treatments
    Delete { id: Uuid },

    /// Close an open file or reopen a closed one
    Toggle { id: Uuid },

    /// Download the patient file as a document
    Export {
        id: Uuid,

        /// Document language (defaults to the configured language)
        #[arg(long, value_enum)]
        lang: Option<Language>,

        /// Where to write the document (defaults to the server's filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Treatment subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TreatmentCommand {
    /// List treatments, for one patient or all
    List {
        /// Restrict to one patient
        #[arg(short, long)]
        patient: Option<Uuid>,

        /// Only treatments whose summary contains this text
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show one treatment
    Show {
        patient_id: Uuid,
        treatment_id: Uuid,

        #[arg(long)]
        json: bool,
    },

    /// Record a treatment
    Add {
        patient_id: Uuid,

        #[arg(long)]
        summary: String,

        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },

    /// Change a treatment
    Update {
        patient_id: Uuid,
        treatment_id: Uuid,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },

    /// Delete a treatment
    Delete {
        patient_id: Uuid,
        treatment_id: Uuid,
    },
}

/// User subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum UserCommand {
    /// List accounts
    List {
        #[arg(long)]
        json: bool,
    },

    /// Create an account
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "CLINIC_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Change name or email
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Change an account's password
    Password {
        id: String,

        #[arg(long, env = "CLINIC_CURRENT_PASSWORD", hide_env_values = true)]
        current: Option<String>,

        #[arg(long = "new", env = "CLINIC_NEW_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },

    /// Delete an account
    Delete { id: String },
}

/// Issue subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum IssueCommand {
    /// File a report on the project tracker
    Report {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: String,

        #[arg(long = "type", value_enum, default_value_t = IssueType::Bug)]
        issue_type: IssueType,

        #[arg(long, value_enum, default_value_t = IssuePriority::Medium)]
        priority: IssuePriority,
    },
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{}': use YYYY-MM-DD or RFC 3339", value))
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_login() {
        let cli = Cli::try_parse_from([
            "clinic",
            "login",
            "--email",
            "admin@clinic.test",
            "--password",
            "pw",
        ])
        .unwrap();
        if let Commands::Login { email, password } = cli.command {
            assert_eq!(email, "admin@clinic.test");
            assert_eq!(password.as_deref(), Some("pw"));
        } else {
            panic!("Expected Login command");
        }
        assert_eq!(cli.config, "config/clinic.yaml");
    }

    #[test]
    fn test_cli_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "clinic",
            "--api-url",
            "https://clinic.example/api",
            "--store",
            "keyring",
            "--lang",
            "he",
            "-v",
            "whoami",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("https://clinic.example/api"));
        assert_eq!(cli.store, Some(StoreKind::Keyring));
        assert_eq!(cli.lang, Some(Language::He));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Whoami));
    }

    #[test]
    fn test_cli_parse_patient_add_with_date() {
        let cli = Cli::try_parse_from([
            "clinic", "patients", "add", "--name", "Dana", "--email", "d@x.io", "--phone", "050",
            "--date", "2024-03-01",
        ])
        .unwrap();
        match cli.command {
            Commands::Patients {
                command:
                    PatientCommand::Add {
                        name,
                        description,
                        date,
                        ..
                    },
            } => {
                assert_eq!(name, "Dana");
                assert_eq!(description, "");
                assert_eq!(date, Some(parse_date("2024-03-01T00:00:00Z").unwrap()));
            }
            other => panic!("Expected patients add, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_non_uuid_patient_id() {
        assert!(Cli::try_parse_from(["clinic", "patients", "show", "42"]).is_err());
    }

    #[test]
    fn test_cli_parse_issue_defaults() {
        let cli = Cli::try_parse_from([
            "clinic",
            "issues",
            "report",
            "--title",
            "Crash",
            "--description",
            "On export",
        ])
        .unwrap();
        match cli.command {
            Commands::Issues {
                command:
                    IssueCommand::Report {
                        issue_type,
                        priority,
                        ..
                    },
            } => {
                assert_eq!(issue_type, IssueType::Bug);
                assert_eq!(priority, IssuePriority::Medium);
            }
            other => panic!("Expected issues report, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-03-01T10:30:00+02:00").is_ok());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("yesterday").is_err());
    }
}
