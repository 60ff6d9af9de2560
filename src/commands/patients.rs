//! Patient commands

use std::path::PathBuf;

use colored::Colorize;
use prettytable::{cell, row, Table};

use crate::cli::PatientCommand;
use crate::client::ClinicClient;
use crate::commands::{matches_filter, print_json};
use crate::error::{ClinicError, Result};
use crate::models::{Language, NewPatient, Patient, PatientUpdate};

/// Runs a patient subcommand.
pub async fn run(client: &ClinicClient, command: PatientCommand, language: Language) -> Result<()> {
    let patients = client.patients();

    match command {
        PatientCommand::List {
            name,
            include_inactive,
            json,
        } => {
            let list = patients.list().await?;
            let shown = filter_patients(&list.patients, name.as_deref(), include_inactive);
            if json {
                print_json(&shown)?;
            } else {
                print_patients_table(&shown);
                println!("{} of {} patients shown", shown.len(), list.count);
            }
        }
        PatientCommand::Show { id, json } => {
            let patient = patients.get(id).await?;
            if json {
                print_json(&patient)?;
            } else {
                print_patient(&patient);
            }
        }
        PatientCommand::Add {
            name,
            email,
            phone,
            description,
            date,
        } => {
            let created = patients
                .create(&NewPatient {
                    name,
                    email,
                    phone_number: phone,
                    description,
                    date,
                })
                .await?;
            println!(
                "{}",
                format!("Added {} ({})", created.patient.name, created.patient.id).green()
            );
        }
        PatientCommand::Update {
            id,
            name,
            email,
            phone,
            description,
            date,
        } => {
            let changes = PatientUpdate {
                name,
                email,
                phone_number: phone,
                description,
                date,
            };
            if changes.is_empty() {
                return Err(ClinicError::Validation("nothing to update".into()).into());
            }
            let updated = patients.update(id, &changes).await?;
            println!("{}", format!("Updated {}", updated.patient.name).green());
        }
        PatientCommand::Delete { id } => {
            patients.delete(id).await?;
            println!("{}", format!("Deleted patient {}", id).green());
        }
        PatientCommand::Toggle { id } => {
            let toggled = patients.toggle_status(id).await?;
            let state = if toggled.patient.active {
                "reopened".green()
            } else {
                "closed".yellow()
            };
            println!("File of {} {}", toggled.patient.name, state);
        }
        PatientCommand::Export { id, lang, output } => {
            let language = lang.unwrap_or(language);
            let document = patients.export(id, language).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(&document.filename));
            tokio::fs::write(&path, &document.bytes).await?;
            println!(
                "{}",
                format!(
                    "Exported to {} ({} bytes, {})",
                    path.display(),
                    document.bytes.len(),
                    language
                )
                .green()
            );
            if language.is_rtl() {
                println!("Document is laid out right-to-left");
            }
        }
    }

    Ok(())
}

/// Applies the list filters: name substring, and closed files only when
/// asked for.
pub fn filter_patients<'a>(
    patients: &'a [Patient],
    name: Option<&str>,
    include_inactive: bool,
) -> Vec<&'a Patient> {
    patients
        .iter()
        .filter(|p| include_inactive || p.active)
        .filter(|p| matches_filter(&p.name, name))
        .collect()
}

fn status_label(active: bool) -> String {
    if active {
        "Active".to_string()
    } else {
        "Inactive".to_string()
    }
}

fn print_patients_table(patients: &[&Patient]) {
    let mut table = Table::new();
    table.add_row(row!["ID", "Name", "Email", "Phone", "Date", "Status"]);
    for patient in patients {
        table.add_row(row![
            patient.id,
            patient.name,
            patient.email,
            patient.phone_number,
            patient.date.format("%Y-%m-%d"),
            status_label(patient.active)
        ]);
    }
    table.printstd();
}

fn print_patient(patient: &Patient) {
    println!("{}", patient.name.bold());
    println!("  id:     {}", patient.id);
    println!("  email:  {}", patient.email);
    println!("  phone:  {}", patient.phone_number);
    println!("  date:   {}", patient.date.format("%Y-%m-%d"));
    println!("  status: {}", status_label(patient.active));
    if !patient.description.is_empty() {
        println!("  notes:  {}", patient.description);
    }
}
